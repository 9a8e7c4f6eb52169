//! Integration tests for the handler: chain traversal, framing and errors.
//!
//! Uses a three-version `Record` schema encoded with postcard:
//! v1 `{id, name}` → v2 adds `description` → v3 adds `tags`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use verchain::{Error, FnCodec, HandlerBuilder, VersionCodec, VersionedDataHandler, Versioned};

// ── Schema definitions ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RecordV1 {
    id: u32,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RecordV2 {
    id: u32,
    name: String,
    description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RecordV3 {
    id: u32,
    name: String,
    description: String,
    tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    V1(RecordV1),
    V2(RecordV2),
    V3(RecordV3),
}

impl Versioned for Record {
    type Latest = RecordV3;

    fn version(&self) -> u16 {
        match self {
            Record::V1(_) => 1,
            Record::V2(_) => 2,
            Record::V3(_) => 3,
        }
    }

    fn from_latest(latest: RecordV3, _latest_version: u16) -> Self {
        Record::V3(latest)
    }

    fn into_latest(self) -> Result<RecordV3, Self> {
        match self {
            Record::V3(record) => Ok(record),
            other => Err(other),
        }
    }
}

// ── Codec and steps ─────────────────────────────────────────────────

fn decode(payload: &[u8], version: u16) -> verchain::Result<Record> {
    match version {
        1 => Ok(Record::V1(postcard::from_bytes(payload).map_err(Error::codec)?)),
        2 => Ok(Record::V2(postcard::from_bytes(payload).map_err(Error::codec)?)),
        3 => Ok(Record::V3(postcard::from_bytes(payload).map_err(Error::codec)?)),
        v => Err(Error::UnknownVersion(v)),
    }
}

fn encode(value: Record, version: u16) -> verchain::Result<Vec<u8>> {
    let bytes = match (value, version) {
        (Record::V1(r), 1) => postcard::to_allocvec(&r),
        (Record::V2(r), 2) => postcard::to_allocvec(&r),
        (Record::V3(r), 3) => postcard::to_allocvec(&r),
        (other, v) => {
            return Err(Error::VersionMismatch {
                expected: v,
                found: other.version(),
            })
        }
    };
    bytes.map_err(Error::codec)
}

fn v1_to_v2(value: Record) -> verchain::Result<Record> {
    match value {
        Record::V1(r) => Ok(Record::V2(RecordV2 {
            id: r.id,
            name: r.name,
            description: "default".into(),
        })),
        other => Ok(other),
    }
}

fn v2_to_v3(value: Record) -> verchain::Result<Record> {
    match value {
        Record::V2(r) => Ok(Record::V3(RecordV3 {
            id: r.id,
            name: r.name,
            description: r.description,
            tags: Vec::new(),
        })),
        other => Ok(other),
    }
}

fn v2_to_v1(value: Record) -> verchain::Result<Record> {
    match value {
        Record::V2(r) => Ok(Record::V1(RecordV1 {
            id: r.id,
            name: r.name,
        })),
        other => Ok(other),
    }
}

fn v3_to_v2(value: Record) -> verchain::Result<Record> {
    match value {
        Record::V3(r) => Ok(Record::V2(RecordV2 {
            id: r.id,
            name: r.name,
            description: r.description,
        })),
        other => Ok(other),
    }
}

fn codec() -> impl VersionCodec<Record> {
    FnCodec::new(decode, encode)
}

fn handler() -> VersionedDataHandler<Record> {
    HandlerBuilder::new(codec())
        .upgrade(v1_to_v2)
        .upgrade(v2_to_v3)
        .downgrade(v2_to_v1)
        .downgrade(v3_to_v2)
        .build()
        .unwrap()
}

fn sample() -> RecordV3 {
    RecordV3 {
        id: 789,
        name: "sample".into(),
        description: "a description".into(),
        tags: vec!["tag1".into(), "tag2".into()],
    }
}

// ── Reads ───────────────────────────────────────────────────────────

#[test]
fn v1_payload_upgrades_to_latest() {
    let v1 = RecordV1 {
        id: 1,
        name: "first".into(),
    };
    let bytes = postcard::to_allocvec(&v1).unwrap();

    let latest = handler().deserialize(&bytes, 1).unwrap();
    assert_eq!(latest.id, 1);
    assert_eq!(latest.name, "first");
    assert_eq!(latest.description, "default");
    assert!(latest.tags.is_empty());
}

#[test]
fn v2_payload_keeps_its_fields() {
    let v2 = RecordV2 {
        id: 456,
        name: "test".into(),
        description: "data".into(),
    };
    let bytes = postcard::to_allocvec(&v2).unwrap();

    let latest = handler().deserialize(&bytes, 2).unwrap();
    assert_eq!(latest.description, "data");
    assert!(latest.tags.is_empty());
}

#[test]
fn latest_payload_is_returned_unchanged() {
    let bytes = postcard::to_allocvec(&sample()).unwrap();
    assert_eq!(handler().deserialize(&bytes, 3).unwrap(), sample());
}

// ── Writes ──────────────────────────────────────────────────────────

#[test]
fn serialize_to_each_version() {
    let h = handler();

    let v1: RecordV1 = postcard::from_bytes(&h.serialize(sample(), 1).unwrap()).unwrap();
    assert_eq!(
        v1,
        RecordV1 {
            id: 789,
            name: "sample".into()
        }
    );

    let v2: RecordV2 = postcard::from_bytes(&h.serialize(sample(), 2).unwrap()).unwrap();
    assert_eq!(v2.description, "a description");

    let v3: RecordV3 = postcard::from_bytes(&h.serialize(sample(), 3).unwrap()).unwrap();
    assert_eq!(v3, sample());
}

#[test]
fn round_trip_at_each_version() {
    let h = handler();

    // At latest nothing is lost.
    let bytes = h.serialize(sample(), 3).unwrap();
    assert_eq!(h.deserialize(&bytes, 3).unwrap(), sample());

    // Older versions lose what they cannot represent; upgrades fill defaults.
    let bytes = h.serialize(sample(), 2).unwrap();
    let back = h.deserialize(&bytes, 2).unwrap();
    assert_eq!(back.description, "a description");
    assert!(back.tags.is_empty());

    let bytes = h.serialize(sample(), 1).unwrap();
    let back = h.deserialize(&bytes, 1).unwrap();
    assert_eq!((back.id, back.name.as_str()), (789, "sample"));
    assert_eq!(back.description, "default");
}

#[test]
fn serialize_value_from_an_older_version() {
    let v2 = Record::V2(RecordV2 {
        id: 456,
        name: "test".into(),
        description: "will be stripped".into(),
    });

    let bytes = handler().serialize_value(v2.clone(), 1).unwrap();
    let v1: RecordV1 = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(v1.id, 456);

    // Upward works too.
    let bytes = handler().serialize_value(v2, 3).unwrap();
    let v3: RecordV3 = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(v3.description, "will be stripped");
}

#[test]
fn migrate_walks_both_directions() {
    let h = handler();
    let v1 = h.migrate(Record::V3(sample()), 1).unwrap();
    assert_eq!(v1.version(), 1);

    let v3 = h.migrate(v1, 3).unwrap();
    assert_eq!(v3.version(), 3);
}

// ── Step accounting ─────────────────────────────────────────────────

/// Chain whose steps only bump a counter and log their position.
fn counting_handler(
    calls: Arc<AtomicUsize>,
    order: Arc<Mutex<Vec<&'static str>>>,
) -> VersionedDataHandler<Record> {
    let step = |name: &'static str, f: fn(Record) -> verchain::Result<Record>| {
        let calls = Arc::clone(&calls);
        let order = Arc::clone(&order);
        move |value: Record| {
            calls.fetch_add(1, Ordering::SeqCst);
            order.lock().unwrap().push(name);
            f(value)
        }
    };

    HandlerBuilder::new(codec())
        .upgrade(step("v1→v2", v1_to_v2))
        .upgrade(step("v2→v3", v2_to_v3))
        .downgrade(step("v2→v1", v2_to_v1))
        .downgrade(step("v3→v2", v3_to_v2))
        .build()
        .unwrap()
}

#[test]
fn no_steps_run_at_latest() {
    let calls = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(Mutex::new(Vec::new()));
    let h = counting_handler(Arc::clone(&calls), Arc::clone(&order));

    let bytes = h.serialize(sample(), 3).unwrap();
    h.deserialize(&bytes, 3).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn upgrades_run_latest_minus_version_steps_in_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(Mutex::new(Vec::new()));
    let h = counting_handler(Arc::clone(&calls), Arc::clone(&order));

    let v1 = postcard::to_allocvec(&RecordV1 {
        id: 1,
        name: "a".into(),
    })
    .unwrap();
    h.deserialize(&v1, 1).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*order.lock().unwrap(), vec!["v1→v2", "v2→v3"]);

    order.lock().unwrap().clear();
    let v2 = postcard::to_allocvec(&RecordV2 {
        id: 1,
        name: "a".into(),
        description: "d".into(),
    })
    .unwrap();
    h.deserialize(&v2, 2).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(*order.lock().unwrap(), vec!["v2→v3"]);
}

#[test]
fn downgrades_start_next_to_latest() {
    let calls = Arc::new(AtomicUsize::new(0));
    let order = Arc::new(Mutex::new(Vec::new()));
    let h = counting_handler(Arc::clone(&calls), Arc::clone(&order));

    h.serialize(sample(), 1).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["v3→v2", "v2→v1"]);

    order.lock().unwrap().clear();
    h.serialize(sample(), 2).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["v3→v2"]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

// ── Embedded version ────────────────────────────────────────────────

#[test]
fn embedded_version_header_is_little_endian() {
    let h = handler();

    let bytes = h.serialize_with_embedded_version(sample(), 1).unwrap();
    assert_eq!(&bytes[..2], &[1, 0]);
    assert_eq!(&bytes[2..], h.serialize(sample(), 1).unwrap().as_slice());

    let bytes = h.serialize_with_embedded_version(sample(), 2).unwrap();
    assert_eq!(&bytes[..2], &[2, 0]);
    assert_eq!(bytes.len(), 2 + h.serialize(sample(), 2).unwrap().len());
}

#[test]
fn embedded_version_round_trip() {
    let h = handler();

    let bytes = h.serialize_with_embedded_version(sample(), 1).unwrap();
    let back = h.deserialize_with_embedded_version(&bytes).unwrap();
    assert_eq!(back.id, 789);
    assert_eq!(back.description, "default");

    let bytes = h.serialize_with_embedded_version(sample(), 3).unwrap();
    assert_eq!(h.deserialize_with_embedded_version(&bytes).unwrap(), sample());
}

#[test]
fn truncated_frames_are_rejected() {
    let h = handler();
    assert!(matches!(
        h.deserialize_with_embedded_version(&[]),
        Err(Error::TruncatedFrame { len: 0 })
    ));
    assert!(matches!(
        h.deserialize_with_embedded_version(&[1]),
        Err(Error::TruncatedFrame { len: 1 })
    ));
}

// ── Errors ──────────────────────────────────────────────────────────

#[test]
fn future_version_is_rejected() {
    let h = handler();
    assert!(matches!(
        h.deserialize(&[], 4),
        Err(Error::FutureVersion {
            requested: 4,
            latest: 3
        })
    ));
    assert!(matches!(
        h.serialize(sample(), 99),
        Err(Error::FutureVersion { requested: 99, .. })
    ));

    let framed: [u8; 3] = [4, 0, 0xAA];
    assert!(matches!(
        h.deserialize_with_embedded_version(&framed),
        Err(Error::FutureVersion { requested: 4, .. })
    ));
}

#[test]
fn future_targets_never_reach_the_codec() {
    let codec_calls = Arc::new(AtomicUsize::new(0));
    let (on_decode, on_encode) = (Arc::clone(&codec_calls), Arc::clone(&codec_calls));
    let h = HandlerBuilder::new(FnCodec::new(
        move |payload: &[u8], version: u16| {
            on_decode.fetch_add(1, Ordering::SeqCst);
            decode(payload, version)
        },
        move |value: Record, version: u16| {
            on_encode.fetch_add(1, Ordering::SeqCst);
            encode(value, version)
        },
    ))
    .upgrade(v1_to_v2)
    .upgrade(v2_to_v3)
    .downgrade(v2_to_v1)
    .downgrade(v3_to_v2)
    .build()
    .unwrap();

    assert!(matches!(
        h.serialize(sample(), 4),
        Err(Error::FutureVersion {
            requested: 4,
            latest: 3
        })
    ));
    assert!(matches!(h.deserialize(&[], 4), Err(Error::FutureVersion { .. })));
    assert_eq!(codec_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn version_zero_is_rejected() {
    let h = handler();
    assert!(matches!(h.deserialize(&[], 0), Err(Error::InvalidVersion(0))));
    assert!(matches!(h.serialize(sample(), 0), Err(Error::InvalidVersion(0))));
}

#[test]
fn chain_one_step_short_reports_missing_migration() {
    let h = HandlerBuilder::new(codec())
        .upgrade(v1_to_v2)
        .downgrade(v2_to_v1)
        .latest_version(3)
        .build()
        .unwrap();

    let v1 = postcard::to_allocvec(&RecordV1 {
        id: 1,
        name: "a".into(),
    })
    .unwrap();
    let err = h.deserialize(&v1, 1).unwrap_err();
    assert!(matches!(err, Error::MissingMigration { from: 2, to: 3 }));
    assert!(err.is_configuration());

    let err = h.serialize(sample(), 1).unwrap_err();
    assert!(matches!(err, Error::MissingMigration { from: 3, to: 2 }));

    assert!(matches!(
        h.validate_chain(1),
        Err(Error::MissingMigration { from: 2, to: 3 })
    ));
    assert!(handler().validate_chain(1).is_ok());
}

#[test]
fn codec_rejects_retired_versions() {
    // v1 is no longer decodable, but still within the handler's range.
    let h = HandlerBuilder::new(FnCodec::new(
        |payload: &[u8], version: u16| match version {
            1 => Err(Error::UnknownVersion(1)),
            v => decode(payload, v),
        },
        encode,
    ))
    .upgrade(v1_to_v2)
    .upgrade(v2_to_v3)
    .build()
    .unwrap();

    assert!(matches!(h.deserialize(&[], 1), Err(Error::UnknownVersion(1))));
}

#[test]
fn malformed_payload_propagates_codec_error() {
    let err = handler().deserialize(&[0xFF], 1).unwrap_err();
    assert!(matches!(err, Error::Codec(_)));
}

#[test]
fn misordered_downgrades_are_caught() {
    // Downgrades registered in walk order instead of by lower version.
    let h = HandlerBuilder::new(codec())
        .upgrade(v1_to_v2)
        .upgrade(v2_to_v3)
        .downgrade(v3_to_v2)
        .downgrade(v2_to_v1)
        .build()
        .unwrap();

    let err = h.serialize(sample(), 2).unwrap_err();
    assert!(matches!(
        err,
        Error::VersionMismatch {
            expected: 2,
            found: 3
        }
    ));
}

// ── Concurrency ─────────────────────────────────────────────────────

#[test]
fn handler_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VersionedDataHandler<Record>>();

    let h = handler();
    let v1 = postcard::to_allocvec(&RecordV1 {
        id: 7,
        name: "shared".into(),
    })
    .unwrap();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let latest = h.deserialize(&v1, 1).unwrap();
                    assert_eq!(latest.id, 7);
                    let bytes = h.serialize(latest, 1).unwrap();
                    assert_eq!(bytes, v1);
                }
            });
        }
    });
}
