//! Message Envelope
//!
//! Routing metadata + opaque body + properties. Immutable setelah
//! dibangun (producer) atau di-decode (consumer): tidak ada setter,
//! hanya accessor dan konversi yang mengonsumsi envelope.

use std::collections::BTreeMap;

use crate::error::EnvelopeError;

/// Side-channel metadata envelope
///
/// Sorted map: urutan encode selalu sama untuk konten yang sama,
/// sehingga output byte-for-byte reproducible.
pub type Properties = BTreeMap<String, String>;

/// Unit pesan yang di-encode/decode sebagai satu kesatuan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    topic: String,
    key: String,
    partition: String,
    born_time: i64,
    ack: bool,
    body: Vec<u8>,
    properties: Properties,
}

/// Semua field envelope, untuk destructuring tanpa clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeParts {
    pub topic: String,
    pub key: String,
    pub partition: String,
    pub born_time: i64,
    pub ack: bool,
    pub body: Vec<u8>,
    pub properties: Properties,
}

impl Envelope {
    /// Mulai membangun envelope untuk `topic`
    pub fn builder(topic: impl Into<String>) -> EnvelopeBuilder {
        EnvelopeBuilder::new(topic)
    }

    /// Rakit envelope hasil decode. Caller (codec) sudah menolak topic
    /// kosong sebagai `Corruption::EmptyTopic`.
    pub(crate) fn from_parts(parts: EnvelopeParts) -> Self {
        let EnvelopeParts {
            topic,
            key,
            partition,
            born_time,
            ack,
            body,
            properties,
        } = parts;
        Self {
            topic,
            key,
            partition,
            born_time,
            ack,
            body,
            properties,
        }
    }

    #[inline(always)]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[inline(always)]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline(always)]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Epoch milliseconds saat producer membuat pesan
    #[inline(always)]
    pub fn born_time(&self) -> i64 {
        self.born_time
    }

    #[inline(always)]
    pub fn ack(&self) -> bool {
        self.ack
    }

    #[inline(always)]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    #[inline(always)]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Ambil body tanpa copy
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn into_parts(self) -> EnvelopeParts {
        EnvelopeParts {
            topic: self.topic,
            key: self.key,
            partition: self.partition,
            born_time: self.born_time,
            ack: self.ack,
            body: self.body,
            properties: self.properties,
        }
    }
}

/// Builder untuk [`Envelope`]
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    topic: String,
    key: String,
    partition: String,
    born_time: Option<i64>,
    ack: bool,
    body: Vec<u8>,
    properties: Properties,
}

impl EnvelopeBuilder {
    fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            key: String::new(),
            partition: String::new(),
            born_time: None,
            ack: false,
            body: Vec::new(),
            properties: Properties::new(),
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    /// Default: waktu saat `build()` dipanggil
    pub fn born_time(mut self, born_time: i64) -> Self {
        self.born_time = Some(born_time);
        self
    }

    pub fn ack(mut self, ack: bool) -> Self {
        self.ack = ack;
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn properties<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.properties
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> Result<Envelope, EnvelopeError> {
        if self.topic.is_empty() {
            return Err(EnvelopeError::EmptyTopic);
        }
        Ok(Envelope {
            topic: self.topic,
            key: self.key,
            partition: self.partition,
            born_time: self.born_time.unwrap_or_else(now_ms),
            ack: self.ack,
            body: self.body,
            properties: self.properties,
        })
    }
}

/// Timestamp saat ini dalam milliseconds (epoch)
#[inline(always)]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let before = now_ms();
        let env = Envelope::builder("orders").build().unwrap();

        assert_eq!(env.topic(), "orders");
        assert_eq!(env.key(), "");
        assert!(!env.ack());
        assert!(env.body().is_empty());
        assert!(env.properties().is_empty());
        assert!(env.born_time() >= before);
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_eq!(
            Envelope::builder("").build().unwrap_err(),
            EnvelopeError::EmptyTopic
        );
    }

    #[test]
    fn test_properties_are_sorted() {
        let env = Envelope::builder("t")
            .property("z", "26")
            .properties([("a", "1"), ("m", "13")])
            .build()
            .unwrap();

        let keys: Vec<_> = env.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "m", "z"]);
        assert_eq!(env.property("m"), Some("13"));
    }

    #[test]
    fn test_into_parts() {
        let env = Envelope::builder("t")
            .body(vec![1, 2, 3])
            .born_time(42)
            .build()
            .unwrap();
        let parts = env.clone().into_parts();
        assert_eq!(parts.born_time, 42);
        assert_eq!(Envelope::from_parts(parts), env);
        assert_eq!(env.into_body(), vec![1, 2, 3]);
    }
}
