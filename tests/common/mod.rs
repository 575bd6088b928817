//! In-process RESP node for integration tests: a TCP listener that decodes
//! multi-bulk requests and answers them through a pluggable handler, plus a
//! small in-memory command implementation covering the surfaces under test.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use shardis::proto::codec::{Decoder, Encoder};
use shardis::Frame;

/// Maps one request (argument list, command name first) to one reply.
pub type Handler = Arc<dyn Fn(Vec<String>) -> Frame + Send + Sync>;

/// Binds an ephemeral port and serves RESP requests with `handler` for the
/// rest of the test process. Every accepted connection gets its own task.
pub async fn spawn_node(handler: Handler) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut decoder = Decoder::new();
                let mut encoder = Encoder::new();
                let mut buf = [0u8; 4096];
                loop {
                    match decoder.decode() {
                        Ok(Some(request)) => {
                            let reply = handler(request_args(&request));
                            encoder.encode(&reply);
                            let data = encoder.take();
                            if sock.write_all(&data).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            let Ok(n) = sock.read(&mut buf).await else {
                                return;
                            };
                            if n == 0 {
                                return;
                            }
                            decoder.append(&buf[..n]);
                        }
                        Err(_) => return,
                    }
                }
            });
        }
    });
    addr
}

/// Like [`Handler`], but the reply is raw wire bytes, so tests can send
/// deliberately malformed data.
pub type RawHandler = Arc<dyn Fn(Vec<String>) -> Vec<u8> + Send + Sync>;

/// Serves decoded requests with `handler`, writing its bytes verbatim.
pub async fn spawn_raw_node(handler: RawHandler) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let mut decoder = Decoder::new();
                let mut buf = [0u8; 4096];
                loop {
                    match decoder.decode() {
                        Ok(Some(request)) => {
                            let reply = handler(request_args(&request));
                            if sock.write_all(&reply).await.is_err() {
                                return;
                            }
                        }
                        Ok(None) => {
                            let Ok(n) = sock.read(&mut buf).await else {
                                return;
                            };
                            if n == 0 {
                                return;
                            }
                            decoder.append(&buf[..n]);
                        }
                        Err(_) => return,
                    }
                }
            });
        }
    });
    addr
}

fn request_args(request: &Frame) -> Vec<String> {
    let Frame::Array(items) = request else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Frame::BulkString(Some(data)) => String::from_utf8_lossy(data).into_owned(),
            other => other.describe(),
        })
        .collect()
}

pub fn bulk(s: &str) -> Frame {
    Frame::BulkString(Some(Bytes::copy_from_slice(s.as_bytes())))
}

pub fn err(message: &str) -> Frame {
    Frame::Error(message.as_bytes().to_vec())
}

/// Builds a CLUSTER SLOTS reply advertising one master per `(begin, end,
/// addr)` range.
pub fn cluster_slots_reply(ranges: &[(u16, u16, SocketAddr)]) -> Frame {
    Frame::Array(
        ranges
            .iter()
            .map(|(begin, end, addr)| {
                Frame::Array(vec![
                    Frame::Integer(i64::from(*begin)),
                    Frame::Integer(i64::from(*end)),
                    Frame::Array(vec![
                        bulk(&addr.ip().to_string()),
                        Frame::Integer(i64::from(addr.port())),
                        bulk("mock-node-id"),
                    ]),
                ])
            })
            .collect(),
    )
}

/// Wraps `inner` so CLUSTER SLOTS is answered by `slots` and everything
/// else passes through.
pub fn with_cluster_slots(slots: Frame, inner: Handler) -> Handler {
    Arc::new(move |args: Vec<String>| {
        if args.len() >= 2
            && args[0].eq_ignore_ascii_case("CLUSTER")
            && args[1].eq_ignore_ascii_case("SLOTS")
        {
            return slots.clone();
        }
        inner(args)
    })
}

#[derive(Default)]
struct Store {
    strings: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
    expirations: HashMap<String, i64>,
}

impl Store {
    fn has_key(&self, key: &str) -> bool {
        self.strings.contains_key(key) || self.sets.contains_key(key)
    }

    fn remove_key(&mut self, key: &str) -> bool {
        let existed = self.strings.remove(key).is_some() | self.sets.remove(key).is_some();
        if existed {
            self.expirations.remove(key);
        }
        existed
    }

    fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .strings
            .keys()
            .chain(self.sets.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

/// A single-node command implementation backed by in-memory maps. CLUSTER
/// SLOTS answers with an error, like a standalone server.
pub fn mini_redis() -> Handler {
    let store = Arc::new(Mutex::new(Store::default()));
    Arc::new(move |args: Vec<String>| {
        let mut store = store.lock().unwrap();
        dispatch(&mut store, &args)
    })
}

fn dispatch(store: &mut Store, args: &[String]) -> Frame {
    let Some(name) = args.first() else {
        return err("ERR empty request");
    };
    match name.to_ascii_uppercase().as_str() {
        "PING" => Frame::SimpleString(b"PONG".to_vec()),
        "CLUSTER" => err("ERR This instance has cluster support disabled"),
        "SET" => {
            let (key, value) = (&args[1], &args[2]);
            if args.iter().any(|a| a.eq_ignore_ascii_case("NX")) && store.has_key(key) {
                return Frame::BulkString(None);
            }
            store.strings.insert(key.clone(), value.clone());
            Frame::SimpleString(b"OK".to_vec())
        }
        "GET" => match store.strings.get(&args[1]) {
            Some(value) => bulk(value),
            None => Frame::BulkString(None),
        },
        "GETSET" => {
            let previous = store.strings.insert(args[1].clone(), args[2].clone());
            match previous {
                Some(value) => bulk(&value),
                None => Frame::BulkString(None),
            }
        }
        "GETRANGE" => {
            let value = store.strings.get(&args[1]).cloned().unwrap_or_default();
            let (start, end): (i64, i64) = (args[2].parse().unwrap(), args[3].parse().unwrap());
            let len = value.len() as i64;
            let start = if start < 0 { (len + start).max(0) } else { start.min(len) };
            let end = if end < 0 { len + end } else { end.min(len - 1) };
            if start > end || len == 0 {
                bulk("")
            } else {
                bulk(&value[start as usize..=end as usize])
            }
        }
        "SETRANGE" => {
            let offset: usize = args[2].parse().unwrap();
            let mut value = store
                .strings
                .get(&args[1])
                .cloned()
                .unwrap_or_default()
                .into_bytes();
            if value.len() < offset + args[3].len() {
                value.resize(offset + args[3].len(), 0);
            }
            value[offset..offset + args[3].len()].copy_from_slice(args[3].as_bytes());
            let len = value.len();
            store
                .strings
                .insert(args[1].clone(), String::from_utf8_lossy(&value).into_owned());
            Frame::Integer(len as i64)
        }
        "MSET" => {
            for pair in args[1..].chunks(2) {
                store.strings.insert(pair[0].clone(), pair[1].clone());
            }
            Frame::SimpleString(b"OK".to_vec())
        }
        "MGET" => Frame::Array(
            args[1..]
                .iter()
                .map(|key| match store.strings.get(key) {
                    Some(value) => bulk(value),
                    None => Frame::BulkString(None),
                })
                .collect(),
        ),
        "INCR" | "INCRBY" | "DECR" | "DECRBY" => {
            let delta: i64 = match name.to_ascii_uppercase().as_str() {
                "INCR" => 1,
                "DECR" => -1,
                "INCRBY" => args[2].parse().unwrap(),
                _ => -args[2].parse::<i64>().unwrap(),
            };
            let current: i64 = match store.strings.get(&args[1]) {
                Some(value) => match value.parse() {
                    Ok(n) => n,
                    Err(_) => return err("ERR value is not an integer or out of range"),
                },
                None => 0,
            };
            let next = current + delta;
            store.strings.insert(args[1].clone(), next.to_string());
            Frame::Integer(next)
        }
        "APPEND" => {
            let value = store.strings.entry(args[1].clone()).or_default();
            value.push_str(&args[2]);
            Frame::Integer(value.len() as i64)
        }
        "STRLEN" => Frame::Integer(
            store
                .strings
                .get(&args[1])
                .map(|v| v.len() as i64)
                .unwrap_or(0),
        ),
        "SADD" => {
            let set = store.sets.entry(args[1].clone()).or_default();
            let mut added = 0;
            for member in &args[2..] {
                if set.insert(member.clone()) {
                    added += 1;
                }
            }
            Frame::Integer(added)
        }
        "SREM" => {
            let Some(set) = store.sets.get_mut(&args[1]) else {
                return Frame::Integer(0);
            };
            let mut removed = 0;
            for member in &args[2..] {
                if set.remove(member) {
                    removed += 1;
                }
            }
            Frame::Integer(removed)
        }
        "SCARD" => Frame::Integer(
            store
                .sets
                .get(&args[1])
                .map(|set| set.len() as i64)
                .unwrap_or(0),
        ),
        "SISMEMBER" => Frame::Integer(
            store
                .sets
                .get(&args[1])
                .map(|set| i64::from(set.contains(&args[2])))
                .unwrap_or(0),
        ),
        "SMEMBERS" => members_reply(
            store
                .sets
                .get(&args[1])
                .cloned()
                .unwrap_or_default(),
        ),
        "SDIFF" | "SINTER" | "SUNION" => {
            members_reply(set_operation(store, name, &args[1..]))
        }
        "SDIFFSTORE" | "SINTERSTORE" | "SUNIONSTORE" => {
            let op = &name[..name.len() - "STORE".len()];
            let result = set_operation(store, op, &args[2..]);
            let len = result.len() as i64;
            store.sets.insert(args[1].clone(), result);
            Frame::Integer(len)
        }
        "DEL" => {
            let mut removed = 0;
            for key in &args[1..] {
                if store.remove_key(key) {
                    removed += 1;
                }
            }
            Frame::Integer(removed)
        }
        "EXISTS" => Frame::Integer(i64::from(store.has_key(&args[1]))),
        "EXPIRE" | "EXPIREAT" => {
            if store.has_key(&args[1]) {
                store
                    .expirations
                    .insert(args[1].clone(), args[2].parse().unwrap());
                Frame::Integer(1)
            } else {
                Frame::Integer(0)
            }
        }
        "TTL" => {
            if !store.has_key(&args[1]) {
                Frame::Integer(-2)
            } else {
                Frame::Integer(store.expirations.get(&args[1]).copied().unwrap_or(-1))
            }
        }
        "PERSIST" => Frame::Integer(i64::from(store.expirations.remove(&args[1]).is_some())),
        "KEYS" => Frame::Array(store.all_keys().iter().map(|key| bulk(key)).collect()),
        "SCAN" => Frame::Array(vec![
            bulk("0"),
            Frame::Array(store.all_keys().iter().map(|key| bulk(key)).collect()),
        ]),
        other => err(&format!("ERR unknown command '{}'", other)),
    }
}

fn set_operation(store: &Store, op: &str, keys: &[String]) -> HashSet<String> {
    let mut sets = keys
        .iter()
        .map(|key| store.sets.get(key).cloned().unwrap_or_default());
    let Some(first) = sets.next() else {
        return HashSet::new();
    };
    sets.fold(first, |acc, set| match op.to_ascii_uppercase().as_str() {
        "SDIFF" => acc.difference(&set).cloned().collect(),
        "SINTER" => acc.intersection(&set).cloned().collect(),
        _ => acc.union(&set).cloned().collect(),
    })
}

fn members_reply(members: HashSet<String>) -> Frame {
    let mut members: Vec<String> = members.into_iter().collect();
    members.sort();
    Frame::Array(members.iter().map(|member| bulk(member)).collect())
}
