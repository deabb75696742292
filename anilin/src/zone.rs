//! A static authoritative zone handler.

use std::collections::HashMap;
use std::time::Duration;

use anilin_proto::rdata::SOA;
use anilin_proto::{Question, RCode, Rdata, RecordType};
use async_trait::async_trait;

use crate::handler::Handler;
use crate::writer::MessageWriter;
use crate::{Context, Query};

/// The records of a zone: relative label to record type to record data.
pub type RRSet = HashMap<String, HashMap<RecordType, Vec<Rdata>>>;

/// Answers queries for a zone of authority from an in-memory table.
///
/// Labels in [`rrs`][Zone::rrs] are relative to the origin: the table entry
/// `"app"` of a zone with origin `"localhost."` answers queries for
/// `"app.localhost."`.
pub struct Zone {
    /// The fully-qualified name of the zone apex.
    pub origin: String,
    /// The TTL stamped on every answer.
    pub ttl: Duration,
    /// The zone's SOA record, answered at the apex and attached to negative
    /// responses.
    pub soa: SOA,
    /// The zone's records.
    pub rrs: RRSet,
}

#[async_trait]
impl Handler for Zone {
    async fn serve_dns(&self, _cx: &Context, w: &mut MessageWriter, query: &Query) {
        for q in &query.message.questions {
            self.answer_question(w, q, query.message.recursion_desired);
        }
    }
}

impl Zone {
    fn answer_question(&self, w: &mut MessageWriter, q: &Question, rd: bool) {
        if q.qname == self.origin {
            w.authoritative(true);
            if q.qtype == RecordType::SOA {
                w.answer(self.origin.clone(), self.ttl, Rdata::SOA(self.soa.clone()));
            } else {
                w.status(RCode::NXRRSet);
                self.soa_authority(w);
            }
            return;
        }

        let Some(label) = self.relative_label(&q.qname) else {
            // not our zone; attach the SOA so the querier learns where
            // authority starts
            self.soa_authority(w);
            return;
        };

        match self.lookup(&label, q.qtype, rd) {
            Some(records) if !records.is_empty() => {
                w.authoritative(true);
                for rdata in records {
                    w.answer(q.qname.clone(), self.ttl, rdata);
                }
            }
            Some(_) => {
                w.authoritative(true);
                w.status(RCode::NXRRSet);
                self.soa_authority(w);
            }
            None => {
                w.authoritative(true);
                w.status(RCode::NXDomain);
                self.soa_authority(w);
            }
        }
    }

    /// Returns all records of `qtype` under `label`, chasing in-zone CNAME
    /// aliases transitively when recursion is desired. The chain keeps its
    /// order: each alias precedes the records of its target.
    fn lookup(&self, label: &str, qtype: RecordType, rd: bool) -> Option<Vec<Rdata>> {
        let types = self.rrs.get(label)?;
        let mut records = types
            .get(&qtype)
            .or_else(|| types.get(&RecordType::CNAME))
            .cloned()
            .unwrap_or_default();

        if rd {
            let mut chased = vec![label.to_string()];
            let mut i = 0;
            while i < records.len() {
                let target = match &records[i] {
                    Rdata::CNAME(alias) => self.relative_label(&alias.cname),
                    _ => None,
                };

                if let Some(target) = target {
                    if !chased.contains(&target) {
                        if let Some(more) =
                            self.rrs.get(&target).and_then(|types| types.get(&qtype))
                        {
                            records.extend(more.iter().cloned());
                        }
                        chased.push(target);
                    }
                }
                i += 1;
            }
        }

        Some(records)
    }

    /// The label of `fqdn` relative to the origin, if `fqdn` lies beneath
    /// it.
    fn relative_label(&self, fqdn: &str) -> Option<String> {
        fqdn.strip_suffix(&self.origin)?
            .strip_suffix('.')
            .map(str::to_string)
    }

    fn soa_authority(&self, w: &mut MessageWriter) {
        w.authority(self.origin.clone(), self.ttl, Rdata::SOA(self.soa.clone()));
    }
}
