//! # stl-cli — SafeTraffic Ledger Command Line
//!
//! The `stl` binary. Reads go straight to the ledger gateway; writes are
//! signed with a local Ed25519 key file.
//!
//! ## Subcommands
//!
//! - `stl hash` — evidence digest of a file or string.
//! - `stl keys` — generate or inspect a key file.
//! - `stl commit` — write the opening file, then commit evidence and metadata.
//! - `stl reveal` — disclose an incident from its opening file.
//! - `stl status` — one incident, with the reveal countdown.
//! - `stl feed` — all incidents, newest first.
//! - `stl dispute` — open or resolve a dispute.
//!
//! ```bash
//! stl keys generate --out agent.key
//! stl --key agent.key commit --evidence photo.jpg --location "4.61,-74.08" --type speeding
//! stl --key agent.key reveal --opening opening-3f2a9c1e7b4d5a60.json --evidence photo.jpg
//! stl --key auditor.key --role primary_auditor dispute resolve 1 --decision stale
//! ```
//!
//! Gateway settings come from `STL_LEDGER_URL`, `STL_CONTRACT`,
//! `STL_API_TOKEN` and `STL_TIMEOUT_SECS`; registry settings from
//! `--config` and `STL_REVEAL_HOURS` / `STL_CONTENT_ROOT`.

pub mod commit;
pub mod context;
pub mod dispute;
pub mod feed;
pub mod hash;
pub mod keys;
pub mod reveal;
pub mod status;
