use super::unexpected;
use crate::cluster::ClusterClient;
use crate::core::command::{self, Cmd, StatusOrNil};
use crate::proto::{Frame, Result};

/// String commands, routed by their key.
pub struct StringCommands<'c> {
    client: &'c ClusterClient,
}

impl<'c> StringCommands<'c> {
    pub(crate) fn new(client: &'c ClusterClient) -> Self {
        Self { client }
    }

    async fn run(&self, cmd: &Cmd, key: &str) -> Result<Frame> {
        super::run(self.client, cmd, Some(key.as_bytes())).await
    }

    /// SET key value.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let cmd = Cmd::new("SET").arg(key.to_string()).arg(value.to_string());
        let reply = self.run(&cmd, key).await?;
        if command::as_status(&reply, Some("OK"), &cmd.diagnostic()) {
            Ok(())
        } else {
            Err(unexpected(&cmd))
        }
    }

    /// SET key value NX: true if the key was set, false if it already
    /// existed (nil reply).
    pub async fn set_nx(&self, key: &str, value: &str) -> Result<bool> {
        let cmd = Cmd::new("SET")
            .arg(key.to_string())
            .arg(value.to_string())
            .arg("NX");
        let reply = self.run(&cmd, key).await?;
        match command::as_status_or_nil(&reply, Some("OK"), &cmd.diagnostic()) {
            StatusOrNil::Matched => Ok(true),
            StatusOrNil::Nil => Ok(false),
            StatusOrNil::Failed => Err(unexpected(&cmd)),
        }
    }

    /// SET key value EX seconds.
    pub async fn set_ex(&self, key: &str, seconds: u64, value: &str) -> Result<()> {
        let cmd = Cmd::new("SET")
            .arg(key.to_string())
            .arg(value.to_string())
            .arg("EX")
            .arg(seconds.to_string());
        let reply = self.run(&cmd, key).await?;
        if command::as_status(&reply, Some("OK"), &cmd.diagnostic()) {
            Ok(())
        } else {
            Err(unexpected(&cmd))
        }
    }

    /// GET key; `None` when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let cmd = Cmd::new("GET").arg(key.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_string_or_nil(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// GETSET key value: the previous value, `None` when there was none.
    pub async fn getset(&self, key: &str, value: &str) -> Result<Option<String>> {
        let cmd = Cmd::new("GETSET").arg(key.to_string()).arg(value.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_string_or_nil(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// GETRANGE key start end.
    pub async fn getrange(&self, key: &str, start: i64, end: i64) -> Result<String> {
        let cmd = Cmd::new("GETRANGE")
            .arg(key.to_string())
            .arg(start.to_string())
            .arg(end.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_string(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// SETRANGE key offset value: the length of the string afterwards.
    pub async fn setrange(&self, key: &str, offset: i64, value: &str) -> Result<i64> {
        let cmd = Cmd::new("SETRANGE")
            .arg(key.to_string())
            .arg(offset.to_string())
            .arg(value.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// MSET key value [key value ...]; routed by the first key.
    pub async fn mset(&self, pairs: &[(&str, &str)]) -> Result<()> {
        let mut cmd = Cmd::new("MSET");
        for (key, value) in pairs {
            cmd = cmd.arg(key.to_string()).arg(value.to_string());
        }
        let key = pairs.first().map(|(key, _)| key.as_bytes());
        let reply = super::run(self.client, &cmd, key).await?;
        if command::as_status(&reply, Some("OK"), &cmd.diagnostic()) {
            Ok(())
        } else {
            Err(unexpected(&cmd))
        }
    }

    /// MGET key [key ...]; `None` slots are missing keys. Routed by the
    /// first key.
    pub async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let cmd = Cmd::new("MGET").args(keys.iter().map(|key| key.to_string()));
        let key = keys.first().map(|key| key.as_bytes());
        let reply = super::run(self.client, &cmd, key).await?;
        command::as_string_array(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// INCR key: the value after the increment.
    pub async fn incr(&self, key: &str) -> Result<i64> {
        let cmd = Cmd::new("INCR").arg(key.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// INCRBY key increment.
    pub async fn incr_by(&self, key: &str, increment: i64) -> Result<i64> {
        let cmd = Cmd::new("INCRBY").arg(key.to_string()).arg(increment.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// DECR key: the value after the decrement.
    pub async fn decr(&self, key: &str) -> Result<i64> {
        let cmd = Cmd::new("DECR").arg(key.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// DECRBY key decrement.
    pub async fn decr_by(&self, key: &str, decrement: i64) -> Result<i64> {
        let cmd = Cmd::new("DECRBY").arg(key.to_string()).arg(decrement.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// APPEND key value: the length of the string afterwards.
    pub async fn append(&self, key: &str, value: &str) -> Result<i64> {
        let cmd = Cmd::new("APPEND").arg(key.to_string()).arg(value.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// STRLEN key.
    pub async fn strlen(&self, key: &str) -> Result<i64> {
        let cmd = Cmd::new("STRLEN").arg(key.to_string());
        let reply = self.run(&cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }
}
