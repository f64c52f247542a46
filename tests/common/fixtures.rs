//! Static log corpora used across harnesses.
//!
//! Each corpus is a `&'static [&'static str]` shaped like the logs tracemix is
//! meant for: `YYYYMMDD/HHMMSS.mmm` boundaries, indented continuations and
//! the occasional line that belongs to no record.

/// An API server log with a multi-line stack trace.
pub const CORPUS_API: &[&str] = &[
    "20220128/233741.100 api: listening on :8080",
    "20220128/233741.500 api: GET /orders 200 12ms",
    "20220128/233742.010 api: POST /orders failed",
    "    at orders::create (orders.rs:88)",
    "    at router::dispatch (router.rs:41)",
    "20220128/233742.900 api: GET /healthz 200 1ms",
    "20220128/233745.000 api: shutting down",
];

/// A database log that starts with a banner before the first record.
pub const CORPUS_DB: &[&str] = &[
    "=== db 14.2 starting ===",
    "",
    "20220128/233741.100 db: ready to accept connections",
    "20220128/233742.010 db: deadlock detected",
    "  DETAIL: process 41 waits for ShareLock",
    "20220128/233743.000 db: checkpoint complete",
];

/// A worker log whose third boundary carries an impossible date.
#[allow(dead_code)]
pub const CORPUS_WORKER: &[&str] = &[
    "20220128/233741.000 worker: picked job 7",
    "20220128/233742.010 worker: job 7 done",
    "20221340/233742.500 worker: clock glitch",
    "  retrying",
    "20220128/233744.000 worker: idle",
];

/// Every record of the three corpora, in merged order with the API source
/// first, the database second and the worker third.
#[allow(dead_code)]
pub const MERGED_FIRST_LINES: &[&str] = &[
    "20220128/233741.000 worker: picked job 7",
    "20220128/233741.100 api: listening on :8080",
    "20220128/233741.100 db: ready to accept connections",
    "20220128/233741.500 api: GET /orders 200 12ms",
    "20220128/233742.010 api: POST /orders failed",
    "20220128/233742.010 db: deadlock detected",
    "20220128/233742.010 worker: job 7 done",
    "20221340/233742.500 worker: clock glitch",
    "20220128/233742.900 api: GET /healthz 200 1ms",
    "20220128/233743.000 db: checkpoint complete",
    "20220128/233744.000 worker: idle",
    "20220128/233745.000 api: shutting down",
];
