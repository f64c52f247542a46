//! Domain-specific assertion macros for tracemix harnesses.
//!
//! These add context-rich failure messages that make it clear which ordering
//! property was violated and where in the merged stream it happened.

/// Assert that record timestamps never decrease.
///
/// ```rust
/// assert_non_decreasing!(records);
/// ```
#[macro_export]
macro_rules! assert_non_decreasing {
    ($records:expr) => {{
        let records: &[tracemix_core::Record] = &$records;
        for (i, pair) in records.windows(2).enumerate() {
            if pair[1].timestamp < pair[0].timestamp {
                panic!(
                    "assert_non_decreasing! failed at position {}:\n  {} {:?}\n  then {} {:?}",
                    i + 1,
                    pair[0].timestamp,
                    pair[0].content[0],
                    pair[1].timestamp,
                    pair[1].content[0]
                );
            }
        }
    }};
}

/// Assert that records sharing a timestamp come out in source order.
///
/// `$order` lists the source ids in tie-break order.
#[macro_export]
macro_rules! assert_ties_in_source_order {
    ($records:expr, $order:expr) => {{
        let records: &[tracemix_core::Record] = &$records;
        let order: &[&str] = &$order;
        let rank = |record: &tracemix_core::Record| {
            order
                .iter()
                .position(|id| *id == record.source.as_str())
                .unwrap_or_else(|| panic!("unexpected source {}", record.source))
        };
        for pair in records.windows(2) {
            if pair[0].timestamp == pair[1].timestamp && rank(&pair[1]) < rank(&pair[0]) {
                panic!(
                    "assert_ties_in_source_order! failed at {}:\n  {} came before {}",
                    pair[0].timestamp, pair[0].source, pair[1].source
                );
            }
        }
    }};
}

/// Assert the first line of every record, in order.
#[macro_export]
macro_rules! assert_first_lines {
    ($records:expr, $expected:expr) => {{
        let records: &[tracemix_core::Record] = &$records;
        let actual: Vec<&str> = records.iter().map(|r| r.content[0].as_str()).collect();
        let expected: Vec<&str> = $expected.iter().map(|s| AsRef::<str>::as_ref(s)).collect();
        pretty_assertions::assert_eq!(actual, expected);
    }};
}
