//! Multiplexing of concurrent queries onto a single connection.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use anilin_proto::Message;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::conn::Conn;
use crate::error::Error;

/// A waiter slot per in-flight message ID. `None` means the session's
/// connection failed and no further queries can be registered.
type Waiters = Arc<Mutex<Option<HashMap<u16, oneshot::Sender<Result<Message, Error>>>>>>;

/// A logical request/response multiplex over a single connection.
///
/// A background reader task continuously receives messages and hands each to
/// the caller whose query carried the same ID. Any number of callers may
/// [`send`][Session::send] concurrently; on a stream connection their
/// queries share one TCP (or TLS) session.
///
/// Dropping the session stops the reader and closes the connection.
pub struct Session {
    conn: Arc<Conn>,
    waiters: Waiters,
    next_id: Arc<AtomicU32>,
    reader: JoinHandle<()>,
}

impl Session {
    pub(crate) fn new(conn: Conn, next_id: Arc<AtomicU32>) -> Self {
        let conn = Arc::new(conn);
        let waiters: Waiters = Arc::new(Mutex::new(Some(HashMap::new())));
        let reader = tokio::spawn(read_loop(conn.clone(), waiters.clone()));

        Self {
            conn,
            waiters,
            next_id,
            reader,
        }
    }

    /// Sends a query and waits for the matching response.
    ///
    /// The query is sent with the next ID from the owning client's counter;
    /// the caller's original ID is restored on the returned message. If the
    /// caller gives up (times out or is dropped) before the response
    /// arrives, the late response is discarded when it does.
    pub async fn send(&self, query: &Message) -> Result<Message, Error> {
        let id = (self.next_id.fetch_add(1, Ordering::Relaxed) as u16).wrapping_add(1);

        let (tx, rx) = oneshot::channel();
        {
            let mut waiters = self.waiters.lock().unwrap();
            match waiters.as_mut() {
                Some(map) => map.insert(id, tx),
                None => return Err(Error::ConnectionClosed("session closed".to_string())),
            };
        }

        let mut msg = query.clone();
        msg.id = id;

        // the frame write runs in its own task so that a caller giving up
        // mid-send cannot leave a half-written frame on the connection
        let conn = self.conn.clone();
        let sent = tokio::spawn(async move { conn.send(&msg).await });
        match sent.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.forget(id);
                return Err(err);
            }
            Err(_) => {
                self.forget(id);
                return Err(Error::ConnectionClosed("send task failed".to_string()));
            }
        }

        match rx.await {
            Ok(Ok(mut res)) => {
                res.id = query.id;
                Ok(res)
            }
            Ok(Err(Error::Truncated(mut partial))) => {
                partial.id = query.id;
                Err(Error::Truncated(partial))
            }
            Ok(Err(err)) => Err(err),
            Err(_) => Err(Error::ConnectionClosed("session closed".to_string())),
        }
    }

    fn forget(&self, id: u16) {
        if let Some(map) = self.waiters.lock().unwrap().as_mut() {
            map.remove(&id);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop(conn: Arc<Conn>, waiters: Waiters) {
    loop {
        match conn.recv().await {
            Ok(msg) => route(&waiters, msg.id, Ok(msg)),
            Err(Error::Truncated(partial)) => {
                let id = partial.id;
                route(&waiters, id, Err(Error::Truncated(partial)));
            }
            Err(err) => {
                // notify every pending caller, then refuse new ones
                let map = waiters.lock().unwrap().take();
                if let Some(map) = map {
                    let reason = err.to_string();
                    for (_, tx) in map {
                        let _ = tx.send(Err(Error::ConnectionClosed(reason.clone())));
                    }
                }

                debug!(error = %err, "session reader stopped");
                return;
            }
        }
    }
}

fn route(waiters: &Waiters, id: u16, result: Result<Message, Error>) {
    let tx = waiters.lock().unwrap().as_mut().and_then(|map| map.remove(&id));
    if let Some(tx) = tx {
        // a closed receiver means the caller gave up; drop the response
        let _ = tx.send(result);
    }
}
