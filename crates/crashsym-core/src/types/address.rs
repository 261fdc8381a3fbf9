//! Instruction address type.

use std::fmt;
use std::num::ParseIntError;
use std::ops::Add;
use std::str::FromStr;

/// Strongly typed instruction address
///
/// This wrapper around `u64` keeps addresses apart from the sizes, line
/// numbers and offsets that travel next to them in map file records.
///
/// Addresses in map files are module-relative, so an `Address` is usually a
/// relative virtual address rather than a pointer in a live process.
///
/// ## Example
///
/// ```rust
/// use crashsym_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x100;
/// assert_eq!(next_addr.value(), 0x1100);
/// assert_eq!(next_addr.offset_from(addr), Some(0x100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use crashsym_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Distance from `base` up to this address
    ///
    /// Returns `None` if `base` lies above `self`.
    pub fn offset_from(self, base: Address) -> Option<u64>
    {
        self.0.checked_sub(base.0)
    }

    /// Parse a hexadecimal address, with or without a `0x` prefix
    ///
    /// This is the encoding every address field in a map file uses.
    ///
    /// ```rust
    /// use crashsym_core::types::Address;
    ///
    /// assert_eq!(Address::from_hex("1f00").unwrap(), Address::new(0x1f00));
    /// assert_eq!(Address::from_hex("0x1F00").unwrap(), Address::new(0x1f00));
    /// assert!(Address::from_hex("xyz").is_err());
    /// ```
    pub fn from_hex(text: &str) -> Result<Self, ParseIntError>
    {
        let digits = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        u64::from_str_radix(digits, 16).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl FromStr for Address
{
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        Address::from_hex(s.trim())
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}
