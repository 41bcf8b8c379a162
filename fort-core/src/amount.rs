use crate::error::LedgerError;

/// Fixed-point amount type used for balances, valuations, and prices.
///
/// An `Amount` is an integer representing a decimal value multiplied by
/// `SCALE`. All division on amounts is floor (truncating) division.
pub type Amount = u128;

/// Scaling factor for fixed-point amounts (18 decimal places)
pub const SCALE: Amount = 1_000_000_000_000_000_000;

/// Largest valuation accepted by the ledger.
///
/// Bounded so that `valuation * SCALE` never overflows in price math.
pub const MAX_VALUATION: Amount = Amount::MAX / SCALE;

/// Denominator for basis-point fee math
pub const BPS_DENOMINATOR: Amount = 10_000;

/// Cap on the redemption fee, in basis points (10%)
pub const MAX_FEE_BPS: u16 = 1_000;

/// A 256-bit intermediate product, split into high and low halves
#[derive(Debug, Clone, Copy)]
struct U256 {
    hi: u128,
    lo: u128,
}

/// Multiply two amounts into a full 256-bit product
fn widening_mul(a: u128, b: u128) -> U256 {
    const MASK: u128 = (1 << 64) - 1;
    let (a_hi, a_lo) = (a >> 64, a & MASK);
    let (b_hi, b_lo) = (b >> 64, b & MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & MASK) + (hl & MASK);
    let lo = (ll & MASK) | ((mid & MASK) << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);

    U256 { hi, lo }
}

/// Floor-divide a 256-bit numerator by a 128-bit divisor.
///
/// Returns None when the quotient does not fit in an `Amount`.
fn div_u256(n: U256, d: u128) -> Option<u128> {
    if n.hi == 0 {
        return Some(n.lo / d);
    }
    if n.hi >= d {
        // Quotient would need more than 128 bits
        return None;
    }

    // Binary long division over the low half; the invariant n.hi < d keeps
    // the running remainder representable.
    let mut rem = n.hi;
    let mut quo: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((n.lo >> i) & 1);
        quo <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quo |= 1;
        }
    }
    Some(quo)
}

/// Compute `a * b / denominator` with floor semantics, without wrapping.
///
/// The product is taken at full 256-bit width, so intermediate overflow
/// never corrupts the result; only a quotient too large for an `Amount`
/// surfaces as `LedgerError::Overflow`.
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> Result<Amount, LedgerError> {
    debug_assert!(denominator > 0, "mul_div denominator must be non-zero");

    // Fast path: the full product already fits in 128 bits
    if let Some(product) = a.checked_mul(b) {
        return Ok(product / denominator);
    }

    div_u256(widening_mul(a, b), denominator).ok_or(LedgerError::Overflow)
}

/// Compute a basis-point fee on `amount`, floor-divided
pub fn bps_fee(amount: Amount, bps: u16) -> Result<Amount, LedgerError> {
    mul_div(amount, bps as Amount, BPS_DENOMINATOR)
}

/// Whether `valuation` lies in the valid range `0 < v <= MAX_VALUATION`
pub fn valuation_in_range(valuation: Amount) -> bool {
    valuation > 0 && valuation <= MAX_VALUATION
}
