//! Token minting
//!
//! One monotonic counter per kind, never rewound. Closing a handle does not
//! free its number, so a stale token can never name a newer resource.
//!
//! | Kind | Token |
//! |------|-------|
//! | Environment | `env<N>` |
//! | Transaction | `<env>.txn<N>` |
//! | Database | `dbi<N>` |
//! | Cursor | `<dbi>.c<N>` |

use keyhold_core::HandleKind;

/// Per-session token generator.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    counters: [u64; 4],
}

impl IdGenerator {
    /// Fresh generator, all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The token `mint` would return next, without consuming it.
    pub fn peek(&self, kind: HandleKind, parent: Option<&str>) -> String {
        let n = self.counters[kind.index()];
        match (kind, parent) {
            (HandleKind::Transaction | HandleKind::Cursor, Some(parent)) => {
                format!("{}.{}{}", parent, kind.prefix(), n)
            }
            _ => format!("{}{}", kind.prefix(), n),
        }
    }

    /// Consume the next token for `kind`.
    pub fn mint(&mut self, kind: HandleKind, parent: Option<&str>) -> String {
        let token = self.peek(kind, parent);
        self.counters[kind.index()] += 1;
        token
    }
}
