//! Record layout tables and their validation.

use super::check::Strictness;
use super::field::BitField;
use super::MAX_RECORD_WORDS;

/// Layout defects found by [`FieldTable::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// Field has zero width or is wider than the codec supports.
    BadWidth { field: &'static str },
    /// Field extends past the end of the record.
    OutOfBounds { field: &'static str },
    /// Two fields claim the same bit.
    Overlap { first: &'static str, second: &'static str },
}

/// Named fields of one record type (one event or descriptor kind).
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    /// Record name, for diagnostics.
    pub name: &'static str,
    /// Record size in 32-bit words.
    pub words: usize,
    pub fields: &'static [(&'static str, BitField)],
}

impl FieldTable {
    /// Check every field lies inside the record and no two fields share a bit.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let record_bits = (self.words.min(MAX_RECORD_WORDS) * 32) as u32;
        let mut occupied = [0u32; MAX_RECORD_WORDS];
        let mut owner: [&'static str; 128] = [""; 128];

        for &(name, field) in self.fields {
            if field.width == 0 || field.width > 64 {
                return Err(LayoutError::BadWidth { field: name });
            }
            if field.end() > record_bits {
                return Err(LayoutError::OutOfBounds { field: name });
            }
            for bit in field.lbn..field.end() {
                let word = (bit / 32) as usize;
                let m = 1u32 << (bit % 32);
                if occupied[word] & m != 0 {
                    return Err(LayoutError::Overlap {
                        first: owner[bit as usize],
                        second: name,
                    });
                }
                occupied[word] |= m;
                owner[bit as usize] = name;
            }
        }

        Ok(())
    }

    /// Validate, turning a defect into a fatal assertion in strict mode.
    #[track_caller]
    pub fn enforce(&self, checks: Strictness) {
        if !checks.is_strict() {
            return;
        }
        if let Err(e) = self.validate() {
            checks.assert(false, format_args!("record {}: {:?}", self.name, e));
        }
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<BitField> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, f)| f)
    }
}
