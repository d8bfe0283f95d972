//! Versioned, write-through cart aggregator.
//!
//! A [`Cart`] owns its lines and its storage backend. Every mutation builds
//! the next set of lines, writes it through to storage and only then swaps
//! it in, so a reload rebuilds exactly the state the user last saw. A failed
//! write leaves the cart as it was.
//!
//! Loading is fail-safe: an unreadable, corrupt, oversized or
//! wrong-version payload yields an empty cart instead of an error. Losing a
//! cart is preferable to a client that cannot start.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::storage::{Storage, StorageError};

/// Storage key of the persisted cart.
pub const CART_STORAGE_KEY: &str = "tradepost.cart";

/// Current persisted schema version. Payloads with any other version are
/// discarded rather than migrated.
pub const CART_SCHEMA_VERSION: u32 = 1;

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product key; unique within a cart.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Price of a single unit.
    pub unit_price: Decimal,
    /// Number of units; always greater than zero in a cart.
    pub quantity: u32,
    /// Product image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLine {
    /// Create a line without an image.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            quantity,
            image_ref: None,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// On-disk shape of a cart.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCart {
    version: u32,
    lines: Vec<CartLine>,
}

/// A keyed, insertion-ordered collection of cart lines bound to a storage backend.
#[derive(Debug)]
pub struct Cart<S: Storage> {
    lines: Vec<CartLine>,
    storage: S,
}

impl<S: Storage> Cart<S> {
    /// Load the cart from storage, falling back to an empty cart.
    pub fn load(storage: S) -> Self {
        let lines = match read_lines(&storage) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart");
                Vec::new()
            }
        };

        let mut cart = Self {
            lines: Vec::with_capacity(lines.len()),
            storage,
        };
        // Re-applying through `merge` restores the invariants even if the
        // payload was edited by hand.
        for line in lines {
            merge(&mut cart.lines, line);
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by product key.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Add a line, merging into an existing line with the same id.
    ///
    /// On merge only the quantity changes; the existing name, price and image
    /// are kept. Adding a zero quantity changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart could not be persisted. The cart
    /// is left unchanged in that case.
    pub fn add(&mut self, line: CartLine) -> Result<(), StorageError> {
        let mut next = self.lines.clone();
        if merge(&mut next, line) {
            self.commit(next)?;
        }
        Ok(())
    }

    /// Remove the line with this id. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart could not be persisted.
    pub fn remove(&mut self, id: &str) -> Result<(), StorageError> {
        if self.get(id).is_none() {
            return Ok(());
        }
        let next = self.lines.iter().filter(|l| l.id != id).cloned().collect();
        self.commit(next)
    }

    /// Set a line's quantity to exactly `quantity`.
    ///
    /// Zero or negative quantities remove the line. Absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart could not be persisted.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> Result<(), StorageError> {
        if quantity <= 0 {
            return self.remove(id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        match self.get(id) {
            Some(line) if line.quantity != quantity => {}
            _ => return Ok(()),
        }
        let mut next = self.lines.clone();
        for line in next.iter_mut().filter(|l| l.id == id) {
            line.quantity = quantity;
        }
        self.commit(next)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the empty cart could not be persisted; the lines
    /// are kept so they still match storage.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.commit(Vec::new())
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Write `next` through to storage, then make it the current lines.
    fn commit(&mut self, next: Vec<CartLine>) -> Result<(), StorageError> {
        let payload = serde_json::to_string(&StoredCartRef {
            version: CART_SCHEMA_VERSION,
            lines: &next,
        })
        .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.storage.save(CART_STORAGE_KEY, &payload)?;
        self.lines = next;
        Ok(())
    }
}

#[derive(Serialize)]
struct StoredCartRef<'a> {
    version: u32,
    lines: &'a [CartLine],
}

/// Apply add semantics to `lines`. Returns whether anything changed.
fn merge(lines: &mut Vec<CartLine>, line: CartLine) -> bool {
    if line.quantity == 0 {
        return false;
    }
    match lines.iter_mut().find(|l| l.id == line.id) {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        }
        None => lines.push(line),
    }
    true
}

fn read_lines<S: Storage>(storage: &S) -> Result<Vec<CartLine>, StorageError> {
    let Some(raw) = storage.load(CART_STORAGE_KEY)? else {
        return Ok(Vec::new());
    };
    crate::storage::check_size(&raw)?;

    let stored: StoredCart =
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt(e.to_string()))?;

    if stored.version != CART_SCHEMA_VERSION {
        tracing::info!(
            found = stored.version,
            expected = CART_SCHEMA_VERSION,
            "Discarding cart with unknown schema version"
        );
        storage.delete(CART_STORAGE_KEY)?;
        return Ok(Vec::new());
    }

    Ok(stored.lines)
}
