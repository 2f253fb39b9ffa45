// SPDX-FileCopyrightText: 2026 Parkd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations, applied on every open.

refinery::embed_migrations!("migrations");

/// Runner over the embedded migration set.
pub fn runner() -> refinery::Runner {
    migrations::runner()
}
