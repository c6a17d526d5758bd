//! Shared test helpers: a scripted prober and canned probe output

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use ttlguess::{GuessError, GuessResult, ProbeKind, Prober, SignatureEntry, SignatureTable};

type Script = HashMap<String, VecDeque<Result<String, String>>>;

/// Prober that replays queued responses per target and records every call
#[derive(Clone, Default)]
pub struct ScriptedProber {
    traces: Arc<Mutex<Script>>,
    pings: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<(ProbeKind, String)>>>,
}

impl ScriptedProber {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(script: &Arc<Mutex<Script>>, target: &str, response: Result<String, String>) {
        script
            .lock()
            .unwrap()
            .entry(target.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queue one successful trial
    pub fn trial(self, target: &str, hops: u32, reply_ttl: u32) -> Self {
        Self::push(&self.traces, target, Ok(trace_output(hops)));
        Self::push(&self.pings, target, Ok(ping_output(reply_ttl)));
        self
    }

    pub fn trace(self, target: &str, output: &str) -> Self {
        Self::push(&self.traces, target, Ok(output.to_string()));
        self
    }

    pub fn ping(self, target: &str, output: &str) -> Self {
        Self::push(&self.pings, target, Ok(output.to_string()));
        self
    }

    pub fn trace_fails(self, target: &str, message: &str) -> Self {
        Self::push(&self.traces, target, Err(message.to_string()));
        self
    }

    pub fn ping_fails(self, target: &str, message: &str) -> Self {
        Self::push(&self.pings, target, Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(ProbeKind, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, kind: ProbeKind, target: &str) -> GuessResult<String> {
        self.calls.lock().unwrap().push((kind, target.to_string()));
        let script = match kind {
            ProbeKind::Trace => &self.traces,
            ProbeKind::Ping => &self.pings,
        };
        let response = script
            .lock()
            .unwrap()
            .get_mut(target)
            .and_then(|queue| queue.pop_front());
        match response {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(GuessError::probe_execution(kind, message)),
            None => Err(GuessError::probe_execution(kind, "no response scripted")),
        }
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn trace(&self, target: &str) -> GuessResult<String> {
        self.next(ProbeKind::Trace, target)
    }

    async fn ping(&self, target: &str) -> GuessResult<String> {
        self.next(ProbeKind::Ping, target)
    }
}

/// traceroute stdout: one line per hop, the header goes to stderr
pub fn trace_output(hops: u32) -> String {
    let mut output = String::new();
    for hop in 1..=hops {
        output.push_str(&format!(" {}  10.0.{}.1  {}.000 ms\n", hop, hop, hop));
    }
    output
}

pub fn ping_output(ttl: u32) -> String {
    format!(
        "PING 203.0.113.7 (203.0.113.7) 56(84) bytes of data.\n\
64 bytes from 203.0.113.7: icmp_seq=1 ttl={} time=9.81 ms\n\
\n\
--- 203.0.113.7 ping statistics ---\n\
1 packets transmitted, 1 received, 0% packet loss, time 0ms\n",
        ttl
    )
}

pub fn table(entries: &[(&str, &str)]) -> SignatureTable {
    SignatureTable::new(
        entries
            .iter()
            .map(|(name, ttl)| SignatureEntry::new(name, "", "ICMP", ttl))
            .collect(),
    )
}
