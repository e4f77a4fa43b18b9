// SPDX-License-Identifier: Apache-2.0

use canon_model::{
    Architecture, CrudService, Layer, TechStack, TechStackStatus, Timestamp,
};
use canon_query::{
    assemble, fetch_slice, CursorCodec, CursorPosition, GroupIndex, LayerFilter, QueryLimits,
    Shell, SliceCriteria,
};
use canon_store::{apply_schema, SqlitePort};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rusqlite::Connection;
use serde::Serialize;
use time::macros::datetime;

const T0: Timestamp = datetime!(2024-06-01 09:00 UTC);

/// Layers get ids 1..=n in insertion order; order indexes may repeat.
fn layers_db(order_indexes: &[i64]) -> Connection {
    let conn = Connection::open_in_memory().expect("memory db");
    apply_schema(&conn).expect("schema");
    {
        let port = SqlitePort::new(&conn);
        let service = CrudService::new(&port);
        let stack = service
            .create(
                &TechStack {
                    name: "stack".to_string(),
                    status: TechStackStatus::Active,
                    language_type: "JAVA".to_string(),
                    language_version: "21".to_string(),
                    framework_type: "SPRING_BOOT".to_string(),
                    framework_version: "3.5.0".to_string(),
                    build_tool_type: "GRADLE".to_string(),
                },
                T0,
            )
            .expect("stack");
        let architecture = service
            .create(
                &Architecture {
                    tech_stack_id: stack,
                    name: "Hexagonal".to_string(),
                    pattern_type: "HEXAGONAL".to_string(),
                    pattern_description: None,
                },
                T0,
            )
            .expect("architecture");
        for (i, order_index) in order_indexes.iter().enumerate() {
            service
                .create(
                    &Layer {
                        architecture_id: architecture,
                        code: format!("L_{i}"),
                        name: format!("Layer {i}"),
                        description: None,
                        order_index: *order_index,
                    },
                    T0,
                )
                .expect("layer");
        }
    }
    conn
}

fn walk(conn: &Connection, size: usize) -> (Vec<i64>, Vec<usize>) {
    let mut cursor: Option<String> = None;
    let mut ids = Vec::new();
    let mut page_sizes = Vec::new();
    loop {
        let criteria = SliceCriteria::from_request(
            cursor.as_deref(),
            Some(size),
            LayerFilter::default(),
            &QueryLimits::default(),
        )
        .expect("criteria");
        let page = fetch_slice::<Layer, _>(conn, &criteria).expect("page");
        assert_eq!(page.next_cursor.is_some(), page.has_next);
        assert_eq!(page.size, page.content.len());
        ids.extend(page.content.iter().map(|row| row.id));
        page_sizes.push(page.size);
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return (ids, page_sizes),
        }
    }
}

struct Row {
    key: u8,
    leaf: u16,
}

#[derive(Serialize)]
struct Node {
    key: u8,
    leaves: Vec<u16>,
}

impl Shell<Row> for Node {
    fn from_row(row: &Row) -> Self {
        Self {
            key: row.key,
            leaves: Vec::new(),
        }
    }

    fn matches(&self, row: &Row) -> bool {
        self.key == row.key
    }
}

fn fold(rows: &[Row]) -> GroupIndex<u8, Node> {
    assemble("node", rows, |r| r.key, |n: &mut Node, r| n.leaves.push(r.leaf))
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn following_cursors_visits_every_row_once_in_order(
        order_indexes in proptest::collection::vec(0_i64..5, 0..30),
        size in 1_usize..8,
    ) {
        let conn = layers_db(&order_indexes);
        let (ids, page_sizes) = walk(&conn, size);

        let mut expected: Vec<(i64, i64)> = order_indexes
            .iter()
            .enumerate()
            .map(|(i, oi)| (*oi, i64::try_from(i).expect("index") + 1))
            .collect();
        expected.sort_unstable();
        let expected_ids: Vec<i64> = expected.into_iter().map(|(_, id)| id).collect();
        prop_assert_eq!(ids, expected_ids);

        let n = order_indexes.len();
        let last = *page_sizes.last().expect("at least one page");
        if n == 0 {
            prop_assert_eq!(page_sizes, vec![0]);
        } else if n % size == 0 {
            // no empty trailing page
            prop_assert_eq!(last, size);
            prop_assert_eq!(page_sizes.len(), n / size);
        } else {
            prop_assert_eq!(last, n % size);
        }
    }

    #[test]
    fn cursor_tokens_round_trip(id in 1_i64..=i64::MAX) {
        let token = CursorCodec::encode(id);
        prop_assert_eq!(CursorCodec::decode(Some(token.as_str())).expect("decode"), CursorPosition::After(id));
    }

    #[test]
    fn tokens_with_non_digits_never_decode(prefix in "[0-9]{0,5}", junk in "[^0-9]{1,4}") {
        let token = format!("{prefix}{junk}");
        prop_assert!(CursorCodec::decode(Some(token.as_str())).is_err());
    }

    #[test]
    fn folding_is_deterministic_and_deduplicates(
        pairs in proptest::collection::vec((0_u8..6, any::<u16>()), 0..60),
    ) {
        let rows: Vec<Row> = pairs.iter().map(|(key, leaf)| Row { key: *key, leaf: *leaf }).collect();
        let first = serde_json::to_string(&fold(&rows)).expect("json");
        let second = serde_json::to_string(&fold(&rows)).expect("json");
        prop_assert_eq!(&first, &second);

        let groups = fold(&rows);
        let mut distinct: Vec<u8> = Vec::new();
        for (key, _) in &pairs {
            if !distinct.contains(key) {
                distinct.push(*key);
            }
        }
        let keys: Vec<u8> = groups.iter().map(|n| n.key).collect();
        prop_assert_eq!(keys, distinct);
        let leaves: usize = groups.iter().map(|n| n.leaves.len()).sum();
        prop_assert_eq!(leaves, rows.len());
        prop_assert_eq!(groups.conflicts(), 0);
    }
}
