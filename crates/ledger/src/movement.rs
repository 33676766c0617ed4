use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, MovementId, ProductId};

/// Direction a movement pushes the stock quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockDirection {
    Inbound,
    Outbound,
}

/// Signed-effect type of a ledger movement.
///
/// `IN`/`RETURN` increase stock, `OUT`/`SALE` decrease it. The plain
/// `{IN, OUT}` pair used by older deployments is a subset of this set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
    #[serde(rename = "SALE")]
    Sale,
    #[serde(rename = "RETURN")]
    Return,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [Self::In, Self::Out, Self::Sale, Self::Return];

    /// The compensating type: applying `reverse(t)` with the same quantity
    /// undoes an application of `t`. Involution: `reverse(reverse(t)) == t`.
    pub fn reverse(self) -> Self {
        match self {
            Self::In => Self::Out,
            Self::Out => Self::In,
            Self::Sale => Self::Return,
            Self::Return => Self::Sale,
        }
    }

    pub fn direction(self) -> StockDirection {
        match self {
            Self::In | Self::Return => StockDirection::Inbound,
            Self::Out | Self::Sale => StockDirection::Outbound,
        }
    }

    /// Net change a movement of `quantity` applies to the product quantity.
    pub fn signed_effect(self, quantity: i64) -> i64 {
        match self.direction() {
            StockDirection::Inbound => quantity,
            StockDirection::Outbound => -quantity,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::Sale => "SALE",
            Self::Return => "RETURN",
        }
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "SALE" => Ok(Self::Sale),
            "RETURN" => Ok(Self::Return),
            other => Err(DomainError::invalid_movement_type(other)),
        }
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger status of an entry.
///
/// An explicit tag, never inferred from remark text: `Voided` entries keep
/// their accounting meaning but have been compensated by a `Reversal`
/// entry; `Reversal` entries are terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    Active,
    Voided,
    Reversal,
}

impl MovementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Voided => "voided",
            Self::Reversal => "reversal",
        }
    }
}

impl FromStr for MovementStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "voided" => Ok(Self::Voided),
            "reversal" => Ok(Self::Reversal),
            other => Err(DomainError::validation(format!(
                "invalid movement status: {other}"
            ))),
        }
    }
}

/// One ledger row: a single inventory change with a signed-effect type.
///
/// Entries are never physically deleted. Voiding appends a compensating
/// `Reversal` entry, links it through `voided_by`/`reversal_of`, and
/// annotates this entry's remarks; quantity and type stay untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub status: MovementStatus,
    /// Set on reversal entries: the movement this one compensates.
    pub reversal_of: Option<MovementId>,
    /// Set on voided entries: the reversal that compensated this one.
    pub voided_by: Option<MovementId>,
    pub remarks: Option<String>,
    pub transaction_date: DateTime<Utc>,
}

impl Movement {
    /// Net contribution of this entry to its product's quantity.
    pub fn signed_effect(&self) -> i64 {
        self.movement_type.signed_effect(self.quantity)
    }
}

/// Fields for a new entry; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovement {
    pub product_id: ProductId,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub status: MovementStatus,
    pub reversal_of: Option<MovementId>,
    pub remarks: Option<String>,
}

impl NewMovement {
    /// An ordinary caller-recorded movement.
    pub fn recorded(
        product_id: ProductId,
        quantity: i64,
        movement_type: MovementType,
        remarks: Option<String>,
    ) -> Self {
        Self {
            product_id,
            quantity,
            movement_type,
            status: MovementStatus::Active,
            reversal_of: None,
            remarks,
        }
    }

    /// The compensating entry written when `original` is voided: same
    /// product and quantity, reverse type.
    pub fn reversal_of(original: &Movement, void_reason: &str) -> Self {
        Self {
            product_id: original.product_id,
            quantity: original.quantity,
            movement_type: original.movement_type.reverse(),
            status: MovementStatus::Reversal,
            reversal_of: Some(original.id),
            remarks: Some(reversal_remarks(original.id, void_reason)),
        }
    }
}

/// In-place update of an entry. `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementPatch {
    pub quantity: Option<i64>,
    pub remarks: Option<String>,
    pub status: Option<MovementStatus>,
    pub voided_by: Option<MovementId>,
    /// Refresh the entry timestamp to now (amendments do, void annotations
    /// of the original entry don't).
    pub refresh_date: bool,
}

impl MovementPatch {
    /// Amendment patch: new quantity and/or remarks, timestamp refreshed.
    pub fn amend(quantity: Option<i64>, remarks: Option<String>) -> Self {
        Self {
            quantity,
            remarks,
            refresh_date: true,
            ..Self::default()
        }
    }

    /// Marks the original entry of a void: annotated remarks, `Voided`
    /// status, link to the reversal. Quantity, type and date stay as-is.
    pub fn mark_voided(annotated_remarks: String, reversal: MovementId) -> Self {
        Self {
            remarks: Some(annotated_remarks),
            status: Some(MovementStatus::Voided),
            voided_by: Some(reversal),
            ..Self::default()
        }
    }
}

/// Remarks written on a reversal entry.
pub fn reversal_remarks(original: MovementId, void_reason: &str) -> String {
    format!("Reversal of Transaction #{original} - {void_reason}")
}

/// Display annotation appended to a voided entry's remarks.
pub fn void_annotation(existing: Option<&str>, void_reason: &str, reversal: MovementId) -> String {
    let marker = format!("[VOIDED: {void_reason}, Reversal: #{reversal}]");
    match existing {
        Some(r) if !r.is_empty() => format!("{r} {marker}"),
        _ => marker,
    }
}
