//! A TTL-expiring answer cache.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anilin_proto::{Message, Question, RCode, Resource};
use async_trait::async_trait;

use crate::handler::Handler;
use crate::writer::MessageWriter;
use crate::{Context, Query};

/// A DNS query cache handler.
///
/// Questions that hit are answered from the cached message with each
/// record's remaining TTL; unanswered questions are forwarded upstream via
/// [`recur`][MessageWriter::recur], and successful responses are cached.
///
/// Hits are served under a shared read lock; the lock is released before
/// recursing, so concurrent misses for the same question race upstream and
/// the last response wins. There is no eviction by size: entries expire
/// lazily when a lookup finds any of their records past its deadline.
#[derive(Default)]
pub struct Cache {
    cache: RwLock<HashMap<Question, Message>>,
}

impl Cache {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&self, msg: &Message, now: SystemTime) {
        let mut entry = Message::default();
        for resource in &msg.answers {
            entry.answers.push(deadline_rr(resource, now));
        }
        for resource in &msg.authorities {
            entry.authorities.push(deadline_rr(resource, now));
        }
        for resource in &msg.additionals {
            entry.additionals.push(deadline_rr(resource, now));
        }

        let mut cache = self.cache.write().unwrap();
        for q in &msg.questions {
            cache.insert(q.clone(), entry.clone());
        }
    }
}

#[async_trait]
impl Handler for Cache {
    /// Answers query questions from the cache, forwards unanswered
    /// questions upstream, then caches the answers from the response.
    async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, query: &Query) {
        let now = SystemTime::now();
        let mut miss = false;

        {
            let cache = self.cache.read().unwrap();
            for q in &query.message.questions {
                if !lookup(&cache, q, w, now) {
                    miss = true;
                }
            }
        }

        if !miss {
            return;
        }

        if let Ok(msg) = w.recur(cx).await {
            if msg.rcode == RCode::NoError {
                self.insert(&msg, now);
            }
        }
    }
}

/// Writes the cached records for `q` to the writer with their remaining
/// TTLs. A missing entry, or any record past its deadline, is a miss for the
/// whole question.
fn lookup(
    cache: &HashMap<Question, Message>,
    q: &Question,
    w: &mut MessageWriter,
    now: SystemTime,
) -> bool {
    let Some(msg) = cache.get(q) else {
        return false;
    };

    let mut answers = Vec::with_capacity(msg.answers.len());
    let mut authorities = Vec::with_capacity(msg.authorities.len());
    let mut additionals = Vec::with_capacity(msg.additionals.len());

    for resource in &msg.answers {
        match remaining_ttl(resource.ttl, now) {
            Some(ttl) => answers.push((resource, ttl)),
            None => return false,
        }
    }
    for resource in &msg.authorities {
        match remaining_ttl(resource.ttl, now) {
            Some(ttl) => authorities.push((resource, ttl)),
            None => return false,
        }
    }
    for resource in &msg.additionals {
        match remaining_ttl(resource.ttl, now) {
            Some(ttl) => additionals.push((resource, ttl)),
            None => return false,
        }
    }

    for (resource, ttl) in answers {
        w.answer(resource.name.clone(), ttl, resource.rdata.clone());
    }
    for (resource, ttl) in authorities {
        w.authority(resource.name.clone(), ttl, resource.rdata.clone());
    }
    for (resource, ttl) in additionals {
        w.additional(resource.name.clone(), ttl, resource.rdata.clone());
    }

    true
}

/// A copy of the resource with its TTL replaced by the absolute deadline,
/// encoded as a duration since the Unix epoch.
fn deadline_rr(resource: &Resource, now: SystemTime) -> Resource {
    Resource {
        ttl: (now + resource.ttl)
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO),
        ..resource.clone()
    }
}

fn remaining_ttl(deadline: Duration, now: SystemTime) -> Option<Duration> {
    let now = now.duration_since(UNIX_EPOCH).ok()?;
    let remaining = deadline.checked_sub(now)?;
    (remaining > Duration::ZERO).then_some(remaining)
}
