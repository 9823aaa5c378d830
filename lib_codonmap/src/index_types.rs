use strong_type::StrongType;

/// A 1-based column index in a mapping table.
///
/// For the reference and the aligned consensus this is the column of the joint alignment.
/// For the original consensus it is the column of the participant's own alignment,
/// which is also how the selection test numbers its sites.
#[derive(StrongType)]
#[strong_type(conversion)]
pub struct AlignmentColumn(usize);

impl AlignmentColumn {
    /// The 0-based offset of this column into a [`PositionArray`](crate::position_index::PositionArray).
    ///
    /// Column 0 lies before the first column and has no offset.
    pub fn offset(&self) -> Option<usize> {
        self.0.checked_sub(1)
    }

    pub fn from_offset(offset: usize) -> Self {
        Self(offset + 1)
    }

    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl std::ops::Sub for AlignmentColumn {
    type Output = usize;

    fn sub(self, other: Self) -> Self::Output {
        self.0 - other.0
    }
}
