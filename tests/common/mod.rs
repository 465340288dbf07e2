//! Shared fixtures: workload wrapper + Avro baseline codec
//!
//! Baseline Avro hanya dipakai untuk validasi round trip dan
//! perbandingan throughput/size, bukan bagian dari data path.

#![allow(dead_code)] // Not every test target uses every fixture

use std::collections::HashMap;
use std::error::Error;

use apache_avro::types::Value;
use apache_avro::Schema;
use hermes_codec::protocol::{Envelope, Properties};
use hermes_codec::workload;

pub const MESSAGE_SCHEMA: &str = r#"
{
    "type": "record",
    "name": "Message",
    "namespace": "hermes.codec.baseline",
    "fields": [
        { "name": "topic", "type": "string" },
        { "name": "key", "type": "string" },
        { "name": "partition", "type": "string" },
        { "name": "bornTime", "type": "long" },
        { "name": "ack", "type": "boolean" },
        { "name": "body", "type": "bytes" },
        { "name": "properties", "type": { "type": "map", "values": "string" } }
    ]
}
"#;

/// Born time tetap supaya workload reproducible antar run
pub const WORKLOAD_BORN_TIME: i64 = 1_700_000_000_000;

/// Workload dengan bentuk yang sama seperti perf runner
pub fn build_workload(messages: usize, body_len: usize, properties: usize) -> Vec<Envelope> {
    workload::build_workload(messages, body_len, properties, WORKLOAD_BORN_TIME)
        .expect("workload topic is non-empty")
}

/// Generic schema-driven encoding untuk envelope yang ekuivalen
pub struct AvroBaseline {
    schema: Schema,
}

impl AvroBaseline {
    pub fn new() -> Self {
        Self {
            schema: Schema::parse_str(MESSAGE_SCHEMA).expect("valid baseline schema"),
        }
    }

    fn to_value(envelope: &Envelope) -> Value {
        let properties: HashMap<String, Value> = envelope
            .properties()
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();

        Value::Record(vec![
            ("topic".into(), Value::String(envelope.topic().into())),
            ("key".into(), Value::String(envelope.key().into())),
            ("partition".into(), Value::String(envelope.partition().into())),
            ("bornTime".into(), Value::Long(envelope.born_time())),
            ("ack".into(), Value::Boolean(envelope.ack())),
            ("body".into(), Value::Bytes(envelope.body().to_vec())),
            ("properties".into(), Value::Map(properties)),
        ])
    }

    fn from_value(value: Value) -> Result<Envelope, Box<dyn Error>> {
        let Value::Record(fields) = value else {
            return Err("avro datum is not a record".into());
        };

        let mut fields: HashMap<String, Value> = fields.into_iter().collect();
        let mut take_string = |name: &str| match fields.remove(name) {
            Some(Value::String(s)) => Ok(s),
            other => Err(format!("field {name}: expected string, got {other:?}")),
        };
        let topic = take_string("topic")?;
        let key = take_string("key")?;
        let partition = take_string("partition")?;

        let Some(Value::Long(born_time)) = fields.remove("bornTime") else {
            return Err("field bornTime: expected long".into());
        };
        let Some(Value::Boolean(ack)) = fields.remove("ack") else {
            return Err("field ack: expected boolean".into());
        };
        let Some(Value::Bytes(body)) = fields.remove("body") else {
            return Err("field body: expected bytes".into());
        };
        let Some(Value::Map(map)) = fields.remove("properties") else {
            return Err("field properties: expected map".into());
        };

        let mut properties = Properties::new();
        for (k, v) in map {
            let Value::String(v) = v else {
                return Err(format!("property {k} is not a string").into());
            };
            properties.insert(k, v);
        }

        Ok(Envelope::builder(topic)
            .key(key)
            .partition(partition)
            .born_time(born_time)
            .ack(ack)
            .body(body)
            .properties(properties)
            .build()?)
    }

    /// Encode semua envelope back-to-back ke satu buffer
    pub fn encode(&self, envelopes: &[Envelope]) -> Result<Vec<u8>, apache_avro::Error> {
        let mut out = Vec::new();
        for envelope in envelopes {
            out.extend_from_slice(&apache_avro::to_avro_datum(
                &self.schema,
                Self::to_value(envelope),
            )?);
        }
        Ok(out)
    }

    /// Decode sampai buffer habis
    pub fn decode(&self, mut bytes: &[u8]) -> Result<Vec<Envelope>, Box<dyn Error>> {
        let mut out = Vec::new();
        while !bytes.is_empty() {
            let value = apache_avro::from_avro_datum(&self.schema, &mut bytes, None)?;
            out.push(Self::from_value(value)?);
        }
        Ok(out)
    }
}
