use super::unexpected;
use crate::cluster::ClusterClient;
use crate::core::command::{self, Cmd, CursorPage};
use crate::proto::Result;

/// Generic key commands. KEYS and SCAN carry no routable key and run on the
/// default connection; everything else is routed by its (first) key.
pub struct KeyCommands<'c> {
    client: &'c ClusterClient,
}

impl<'c> KeyCommands<'c> {
    pub(crate) fn new(client: &'c ClusterClient) -> Self {
        Self { client }
    }

    /// DEL key [key ...]: how many keys were removed. Routed by the first
    /// key.
    pub async fn del(&self, keys: &[&str]) -> Result<i64> {
        let cmd = Cmd::new("DEL").args(keys.iter().map(|key| key.to_string()));
        let key = keys.first().map(|key| key.as_bytes());
        let reply = super::run(self.client, &cmd, key).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// EXISTS key.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let cmd = Cmd::new("EXISTS").arg(key.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic())
            .map(|n| n > 0)
            .ok_or_else(|| unexpected(&cmd))
    }

    /// EXPIRE key seconds: false when the key does not exist.
    pub async fn expire(&self, key: &str, seconds: i64) -> Result<bool> {
        let cmd = Cmd::new("EXPIRE").arg(key.to_string()).arg(seconds.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic())
            .map(|n| n > 0)
            .ok_or_else(|| unexpected(&cmd))
    }

    /// EXPIREAT key unix-timestamp: false when the key does not exist.
    pub async fn expire_at(&self, key: &str, timestamp: i64) -> Result<bool> {
        let cmd = Cmd::new("EXPIREAT")
            .arg(key.to_string())
            .arg(timestamp.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic())
            .map(|n| n > 0)
            .ok_or_else(|| unexpected(&cmd))
    }

    /// TTL key: seconds remaining, `-1` without an expiry, `-2` when the key
    /// does not exist.
    pub async fn ttl(&self, key: &str) -> Result<i64> {
        let cmd = Cmd::new("TTL").arg(key.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// PERSIST key: true when an expiry was removed.
    pub async fn persist(&self, key: &str) -> Result<bool> {
        let cmd = Cmd::new("PERSIST").arg(key.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic())
            .map(|n| n > 0)
            .ok_or_else(|| unexpected(&cmd))
    }

    /// KEYS pattern. Only sees keys on the node behind the default
    /// connection; use [`scan`](Self::scan) for incremental enumeration.
    pub async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let cmd = Cmd::new("KEYS").arg(pattern.to_string());
        let reply = super::run(self.client, &cmd, None).await?;
        command::as_string_array(&reply, &cmd.diagnostic())
            .map(|keys| keys.into_iter().flatten().collect())
            .ok_or_else(|| unexpected(&cmd))
    }

    /// SCAN cursor [MATCH pattern] [COUNT count]: one enumeration page from
    /// the node behind the default connection.
    pub async fn scan(
        &self,
        cursor: u64,
        pattern: Option<&str>,
        count: Option<u64>,
    ) -> Result<CursorPage> {
        let mut cmd = Cmd::new("SCAN").arg(cursor.to_string());
        if let Some(pattern) = pattern {
            cmd = cmd.arg("MATCH").arg(pattern.to_string());
        }
        if let Some(count) = count {
            cmd = cmd.arg("COUNT").arg(count.to_string());
        }
        let reply = super::run(self.client, &cmd, None).await?;
        let page = command::as_cursor_array(&reply, &cmd.diagnostic());
        if page.is_valid() {
            Ok(page)
        } else {
            Err(unexpected(&cmd))
        }
    }
}
