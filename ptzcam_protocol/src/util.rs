//! # Internal utilities
use std::fmt::{Display, Formatter};

/// [Display] wrapper which renders a byte slice as space-separated hex pairs,
/// the way VISCA commands are usually written down (`81 01 06 04 ff`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexBytes<'a>(pub &'a [u8]);

impl Display for HexBytes<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for b in self.0 {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{b:02x}")?;
            first = false;
        }
        Ok(())
    }
}
