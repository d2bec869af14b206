//! Roundtrip Invariant Tests
//!
//! - Shredding then assembling reproduces every record the schema covers
//! - Absent fields become nulls whose definition level marks the deepest
//!   present ancestor
//! - Consecutive records never leak state into each other
//! - Shredding and assembly are deterministic

use dremel::{
    assemble_all, Assembler, ColumnEntry, DremelError, DremelResult, Fsm, NodeId, Schema,
    Shredder, StreamReader, StripedColumns,
};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn links_schema() -> Schema {
    Schema::parse(["doc.links[*].url", "doc.links[*].language"]).unwrap()
}

fn document_schema() -> Schema {
    Schema::parse([
        "DocId",
        "Links.Backward[*]",
        "Links.Forward[*]",
        "Name[*].Language[*].Code",
        "Name[*].Language[*].Country",
        "Name[*].Url",
    ])
    .unwrap()
}

fn document_r1() -> Value {
    json!({
        "DocId": 10,
        "Links": {"Forward": [20, 40, 60]},
        "Name": [
            {
                "Language": [
                    {"Code": "en-us", "Country": "us"},
                    {"Code": "en"}
                ],
                "Url": "http://A"
            },
            {"Url": "http://B"},
            {"Language": [{"Code": "en-gb", "Country": "gb"}]}
        ]
    })
}

fn document_r2() -> Value {
    json!({
        "DocId": 20,
        "Links": {"Backward": [10, 30], "Forward": [80]},
        "Name": [{"Url": "http://C"}]
    })
}

fn shred_all(schema: &Schema, records: &[Value]) -> StripedColumns {
    let shredder = Shredder::new(schema);
    let mut columns = StripedColumns::new(schema);
    for record in records {
        shredder.shred(record, &mut columns).unwrap();
    }
    columns
}

fn roundtrip(schema: &Schema, records: &[Value]) -> Vec<Value> {
    let columns = shred_all(schema, records);
    columns.validate(schema).unwrap();
    let fsm = Fsm::build(schema);
    assemble_all(schema, &fsm, &columns).unwrap()
}

fn triples(columns: &StripedColumns, leaf: usize) -> Vec<(Option<Value>, u16, u16)> {
    columns.columns()[leaf]
        .iter()
        .map(|e| (e.value.clone(), e.repetition_level, e.definition_level))
        .collect()
}

// =============================================================================
// Links Scenarios
// =============================================================================

/// A missing leaf inside a present element is a null below the leaf's max.
#[test]
fn test_partial_link_roundtrip() {
    let schema = links_schema();
    let record = json!({"doc": {"links": [{"url": "a.com", "language": "en"}, {"url": "b.com"}]}});

    let columns = shred_all(&schema, &[record.clone()]);
    assert_eq!(triples(&columns, 1), vec![(Some(json!("en")), 0, 3), (None, 1, 2)]);

    assert_eq!(roundtrip(&schema, &[record.clone()]), vec![record]);
}

/// An empty group defines every column up to the group's depth.
#[test]
fn test_empty_doc_roundtrip() {
    let schema = links_schema();
    let record = json!({"doc": {}});

    let columns = shred_all(&schema, &[record.clone()]);
    for leaf in 0..2 {
        assert_eq!(triples(&columns, leaf), vec![(None, 0, 1)]);
    }

    assert_eq!(roundtrip(&schema, &[record.clone()]), vec![record]);
}

/// An empty record leaves every column undefined.
#[test]
fn test_empty_record_roundtrip() {
    let schema = links_schema();
    let record = json!({});

    let columns = shred_all(&schema, &[record.clone()]);
    for leaf in 0..2 {
        assert_eq!(triples(&columns, leaf), vec![(None, 0, 0)]);
    }

    assert_eq!(roundtrip(&schema, &[record.clone()]), vec![record]);
}

/// Records with different repetition counts assemble independently.
#[test]
fn test_consecutive_records_do_not_leak() {
    let schema = links_schema();
    let one = json!({"doc": {"links": [{"url": "a.com"}]}});
    let three = json!({"doc": {"links": [
        {"url": "b.com", "language": "en"},
        {"language": "fr"},
        {"url": "d.com"}
    ]}});

    let records = vec![one.clone(), three.clone(), one.clone(), json!({}), three];
    assert_eq!(roundtrip(&schema, &records), records);
}

#[test]
fn test_element_with_no_leaves_roundtrip() {
    let schema = links_schema();
    let record = json!({"doc": {"links": [{"language": "fr"}, {}, {"url": "c.com"}]}});
    assert_eq!(roundtrip(&schema, &[record.clone()]), vec![record]);
}

// =============================================================================
// Document Records
// =============================================================================

#[test]
fn test_document_r1_column_levels() {
    let schema = document_schema();
    let columns = shred_all(&schema, &[document_r1()]);

    assert_eq!(triples(&columns, 0), vec![(Some(json!(10)), 0, 1)]);
    assert_eq!(triples(&columns, 1), vec![(None, 0, 1)]);
    assert_eq!(
        triples(&columns, 2),
        vec![
            (Some(json!(20)), 0, 2),
            (Some(json!(40)), 1, 2),
            (Some(json!(60)), 1, 2)
        ]
    );
    assert_eq!(
        triples(&columns, 3),
        vec![
            (Some(json!("en-us")), 0, 3),
            (Some(json!("en")), 2, 3),
            (None, 1, 1),
            (Some(json!("en-gb")), 1, 3)
        ]
    );
    assert_eq!(
        triples(&columns, 4),
        vec![
            (Some(json!("us")), 0, 3),
            (None, 2, 2),
            (None, 1, 1),
            (Some(json!("gb")), 1, 3)
        ]
    );
    assert_eq!(
        triples(&columns, 5),
        vec![
            (Some(json!("http://A")), 0, 2),
            (Some(json!("http://B")), 1, 2),
            (None, 1, 1)
        ]
    );
}

#[test]
fn test_document_r2_column_levels() {
    let schema = document_schema();
    let columns = shred_all(&schema, &[document_r2()]);

    assert_eq!(
        triples(&columns, 1),
        vec![(Some(json!(10)), 0, 2), (Some(json!(30)), 1, 2)]
    );
    assert_eq!(triples(&columns, 3), vec![(None, 0, 1)]);
    assert_eq!(triples(&columns, 4), vec![(None, 0, 1)]);
    assert_eq!(triples(&columns, 5), vec![(Some(json!("http://C")), 0, 2)]);
}

#[test]
fn test_document_records_roundtrip() {
    let schema = document_schema();
    let records = vec![document_r1(), document_r2()];
    assert_eq!(roundtrip(&schema, &records), records);
}

/// Every column opens exactly one entry per record.
#[test]
fn test_one_record_start_per_column() {
    let schema = document_schema();
    let records = vec![document_r1(), document_r2(), json!({}), json!({"Name": [{}]})];
    let columns = shred_all(&schema, &records);

    for column in columns.columns() {
        assert_eq!(column.record_count(), records.len(), "column {}", column.path);
        assert!(column.entries[0].starts_record());
    }
}

// =============================================================================
// Readers
// =============================================================================

/// Readers can be lazy and heterogeneous behind a trait object.
#[test]
fn test_assemble_from_lazy_boxed_readers() {
    let schema = links_schema();
    let fsm = Fsm::build(&schema);
    let record = json!({"doc": {"links": [{"url": "a.com", "language": "en"}, {"url": "b.com"}]}});
    let columns = shred_all(&schema, &[record.clone()]);

    let encoded: Vec<Vec<String>> = columns
        .columns()
        .iter()
        .map(|c| c.iter().map(|e| serde_json::to_string(e).unwrap()).collect())
        .collect();

    let readers: Vec<Box<dyn dremel::ColumnReader + '_>> = encoded
        .iter()
        .map(|lines| {
            let lazy = lines
                .iter()
                .map(|line| serde_json::from_str::<ColumnEntry>(line).unwrap());
            Box::new(StreamReader::new(lazy)) as Box<dyn dremel::ColumnReader + '_>
        })
        .collect();

    let assembled: Vec<Value> = Assembler::new(&schema, &fsm, readers)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(assembled, vec![record]);
}

// =============================================================================
// Determinism and Segments
// =============================================================================

#[test]
fn test_shredding_is_deterministic() {
    let schema = document_schema();
    let records = vec![document_r1(), document_r2()];
    let first = shred_all(&schema, &records);
    for _ in 0..5 {
        assert_eq!(shred_all(&schema, &records), first);
    }
}

/// Independently shredded segments concatenate into the same columns.
#[test]
fn test_appended_segments_match_single_pass() {
    let schema = document_schema();
    let records = vec![document_r1(), document_r2(), json!({"DocId": 30})];

    let whole = shred_all(&schema, &records);
    let mut joined = shred_all(&schema, &records[..1]);
    joined.append(shred_all(&schema, &records[1..])).unwrap();

    assert_eq!(joined, whole);
    let fsm = Fsm::build(&schema);
    assert_eq!(assemble_all(&schema, &fsm, &joined).unwrap(), records);
}

#[test]
fn test_columns_survive_serialization() {
    let schema = document_schema();
    let records = vec![document_r1(), document_r2()];
    let columns = shred_all(&schema, &records);

    let text = serde_json::to_string(&columns).unwrap();
    let decoded: StripedColumns = serde_json::from_str(&text).unwrap();
    decoded.validate(&schema).unwrap();

    let fsm = Fsm::build(&schema);
    assert_eq!(assemble_all(&schema, &fsm, &decoded).unwrap(), records);
}

// =============================================================================
// Pipeline Errors
// =============================================================================

fn pipeline(paths: &[&str], records: &[Value]) -> DremelResult<Vec<Value>> {
    let schema = Schema::parse(paths)?;
    let shredder = Shredder::new(&schema);
    let mut columns = StripedColumns::new(&schema);
    for record in records {
        shredder.shred(record, &mut columns)?;
    }
    let fsm = Fsm::build(&schema);
    Ok(assemble_all(&schema, &fsm, &columns)?)
}

#[test]
fn test_pipeline_errors_keep_their_codes() {
    let records = vec![json!({"doc": {"links": [{"url": "a.com"}]}})];
    let paths = ["doc.links[*].url", "doc.links[*].language"];
    assert_eq!(pipeline(&paths, &records).unwrap(), records);

    let err = pipeline(&["doc..url"], &records).unwrap_err();
    assert!(matches!(err, DremelError::Schema(_)));
    assert_eq!(err.code(), "DREMEL_SCHEMA_MALFORMED_PATH");

    let err = pipeline(&paths, &[json!({"doc": {"links": 1}})]).unwrap_err();
    assert!(matches!(err, DremelError::Shred(_)));
    assert_eq!(err.code(), "DREMEL_SHRED_EXPECTED_ARRAY");
}

// =============================================================================
// Generated Records
// =============================================================================

/// xorshift64, so every run generates the same records
struct Generator(u64);

impl Generator {
    fn below(&mut self, bound: u64) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0 % bound
    }

    fn scalar(&mut self) -> Value {
        match self.below(4) {
            0 => json!(self.below(1000)),
            1 => json!(format!("s{}", self.below(50))),
            2 => json!(self.below(2) == 0),
            _ => json!(-(self.below(100) as i64) - 1),
        }
    }

    /// A record covering `node`: fields absent a quarter of the time,
    /// repeated fields with one to three elements.
    fn value(&mut self, schema: &Schema, node: NodeId) -> Value {
        let descriptor = schema.node(node);
        if descriptor.is_leaf() {
            return self.scalar();
        }

        let mut fields = Map::new();
        for &child in descriptor.children() {
            if self.below(4) == 0 {
                continue;
            }
            let value = if schema.node(child).is_repeated() {
                let count = 1 + self.below(3);
                Value::Array((0..count).map(|_| self.value(schema, child)).collect())
            } else {
                self.value(schema, child)
            };
            fields.insert(schema.node(child).name().to_string(), value);
        }
        Value::Object(fields)
    }
}

fn generated_schemas() -> Vec<Schema> {
    vec![
        Schema::parse(["a[*].b[*].c[*]", "a[*].d", "a[*].b[*].e"]).unwrap(),
        Schema::parse(["a[*].b.c[*].d", "a[*].b.e", "a[*].f[*]"]).unwrap(),
        Schema::parse(["g[*].x", "g[*].y[*]", "w[*]"]).unwrap(),
        Schema::parse(["p.q[*].r.s", "p.t", "u[*].v[*].w[*]", "z"]).unwrap(),
        document_schema(),
    ]
}

/// Any batch of conforming records survives shredding and assembly.
#[test]
fn test_generated_batches_roundtrip() {
    let mut generator = Generator(0x9E37_79B9_7F4A_7C15);

    for schema in generated_schemas() {
        let fsm = Fsm::build(&schema);
        for batch in 0..500 {
            let records: Vec<Value> = (0..3)
                .map(|_| generator.value(&schema, schema.root()))
                .collect();

            let columns = shred_all(&schema, &records);
            columns.validate(&schema).unwrap();
            let assembled = assemble_all(&schema, &fsm, &columns).unwrap();
            assert_eq!(assembled, records, "schema {:?}, batch {}", schema.paths(), batch);
        }
    }
}

/// Every generated record opens each column exactly once.
#[test]
fn test_generated_batches_cover_every_leaf() {
    let mut generator = Generator(42);

    for schema in generated_schemas() {
        let records: Vec<Value> = (0..50)
            .map(|_| generator.value(&schema, schema.root()))
            .collect();
        let columns = shred_all(&schema, &records);
        for column in columns.columns() {
            assert_eq!(column.record_count(), records.len(), "column {}", column.path);
        }
    }
}

