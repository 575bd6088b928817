use super::unexpected;
use crate::cluster::ClusterClient;
use crate::core::command::{self, Cmd};
use crate::proto::Result;

/// Set commands, routed by their key (the destination key for the store
/// variants, the first key for the multi-key operations).
pub struct SetCommands<'c> {
    client: &'c ClusterClient,
}

impl<'c> SetCommands<'c> {
    pub(crate) fn new(client: &'c ClusterClient) -> Self {
        Self { client }
    }

    /// SADD key member [member ...]: how many members were newly added.
    pub async fn sadd(&self, key: &str, members: &[&str]) -> Result<i64> {
        let cmd = Cmd::new("SADD")
            .arg(key.to_string())
            .args(members.iter().map(|member| member.to_string()));
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// SREM key member [member ...]: how many members were removed.
    pub async fn srem(&self, key: &str, members: &[&str]) -> Result<i64> {
        let cmd = Cmd::new("SREM")
            .arg(key.to_string())
            .args(members.iter().map(|member| member.to_string()));
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// SCARD key: the set's cardinality.
    pub async fn scard(&self, key: &str) -> Result<i64> {
        let cmd = Cmd::new("SCARD").arg(key.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }

    /// SISMEMBER key member.
    pub async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        let cmd = Cmd::new("SISMEMBER").arg(key.to_string()).arg(member.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic())
            .map(|n| n > 0)
            .ok_or_else(|| unexpected(&cmd))
    }

    /// SMEMBERS key.
    pub async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        let cmd = Cmd::new("SMEMBERS").arg(key.to_string());
        let reply = super::run(self.client, &cmd, Some(key.as_bytes())).await?;
        command::as_string_array(&reply, &cmd.diagnostic())
            .map(|members| members.into_iter().flatten().collect())
            .ok_or_else(|| unexpected(&cmd))
    }

    /// SDIFF key [key ...].
    pub async fn sdiff(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.set_operation("SDIFF", keys).await
    }

    /// SINTER key [key ...].
    pub async fn sinter(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.set_operation("SINTER", keys).await
    }

    /// SUNION key [key ...].
    pub async fn sunion(&self, keys: &[&str]) -> Result<Vec<String>> {
        self.set_operation("SUNION", keys).await
    }

    /// SDIFFSTORE destination key [key ...]: resulting cardinality.
    pub async fn sdiffstore(&self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.set_operation_store("SDIFFSTORE", destination, keys).await
    }

    /// SINTERSTORE destination key [key ...]: resulting cardinality.
    pub async fn sinterstore(&self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.set_operation_store("SINTERSTORE", destination, keys).await
    }

    /// SUNIONSTORE destination key [key ...]: resulting cardinality.
    pub async fn sunionstore(&self, destination: &str, keys: &[&str]) -> Result<i64> {
        self.set_operation_store("SUNIONSTORE", destination, keys).await
    }

    async fn set_operation(&self, op: &'static str, keys: &[&str]) -> Result<Vec<String>> {
        let cmd = Cmd::new(op).args(keys.iter().map(|key| key.to_string()));
        let key = keys.first().map(|key| key.as_bytes());
        let reply = super::run(self.client, &cmd, key).await?;
        command::as_string_array(&reply, &cmd.diagnostic())
            .map(|members| members.into_iter().flatten().collect())
            .ok_or_else(|| unexpected(&cmd))
    }

    async fn set_operation_store(
        &self,
        op: &'static str,
        destination: &str,
        keys: &[&str],
    ) -> Result<i64> {
        let cmd = Cmd::new(op)
            .arg(destination.to_string())
            .args(keys.iter().map(|key| key.to_string()));
        let reply = super::run(self.client, &cmd, Some(destination.as_bytes())).await?;
        command::as_integer(&reply, &cmd.diagnostic()).ok_or_else(|| unexpected(&cmd))
    }
}
