//! Pure transformations over a block sequence.
//!
//! Every operation borrows the input and returns `Cow::Borrowed` of that same
//! slice when nothing changed, `Cow::Owned` when a new sequence was built.
//! Indices are the only block identity, so an out-of-range index (stale after
//! a removal) is a silent no-op.

use std::borrow::Cow;

use crate::model::{Block, BlockKind, ImageAlignment, ImageBlock, TextBlock};
use crate::styles::CUSTOM_STYLE_ID;

/// A single-field edit addressed to one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockField {
    /// Legal on both kinds
    Role(String),
    /// Text blocks only
    Text(String),
    /// Image blocks only
    Src(String),
    /// Image blocks only
    AltText(String),
    /// Image blocks only
    Alignment(ImageAlignment),
}

impl BlockField {
    /// Kind this field belongs to; `None` if legal on every kind
    pub fn kind(&self) -> Option<BlockKind> {
        match self {
            BlockField::Role(_) => None,
            BlockField::Text(_) => Some(BlockKind::Text),
            BlockField::Src(_) | BlockField::AltText(_) | BlockField::Alignment(_) => {
                Some(BlockKind::Image)
            }
        }
    }

    pub fn applies_to(&self, kind: BlockKind) -> bool {
        self.kind().map_or(true, |k| k == kind)
    }
}

/// Append `block`, returning the new sequence and the appended index
pub fn append(blocks: &[Block], block: Block) -> (Vec<Block>, usize) {
    let mut next = Vec::with_capacity(blocks.len() + 1);
    next.extend_from_slice(blocks);
    next.push(block);
    let index = next.len() - 1;
    (next, index)
}

/// Remove exactly one block
pub fn remove_at(blocks: &[Block], index: usize) -> Cow<'_, [Block]> {
    if index >= blocks.len() {
        return Cow::Borrowed(blocks);
    }
    let mut next = blocks.to_vec();
    next.remove(index);
    Cow::Owned(next)
}

/// Apply a style picker choice. Picking the custom sentinel keeps whatever
/// role the block already has, including an empty one.
pub fn set_role_at<'a>(blocks: &'a [Block], index: usize, choice: &str) -> Cow<'a, [Block]> {
    if choice == CUSTOM_STYLE_ID {
        return Cow::Borrowed(blocks);
    }
    set_field_at(blocks, index, &BlockField::Role(choice.to_owned()))
}

/// Apply a field edit if it is legal for the block's kind.
///
/// A field for the other kind is ignored: an editor input still bound to an
/// index whose block was replaced must not write into the new block.
pub fn set_field_at<'a>(blocks: &'a [Block], index: usize, update: &BlockField) -> Cow<'a, [Block]> {
    let Some(current) = blocks.get(index) else {
        return Cow::Borrowed(blocks);
    };
    match apply_field(current, update) {
        Some(updated) => {
            let mut next = blocks.to_vec();
            next[index] = updated;
            Cow::Owned(next)
        }
        None => Cow::Borrowed(blocks),
    }
}

/// `Some(new block)` when the edit applies and changes something
fn apply_field(block: &Block, update: &BlockField) -> Option<Block> {
    match (block, update) {
        (_, BlockField::Role(role)) => (block.role() != role.as_str()).then(|| block.with_role(role)),
        (Block::Text(b), BlockField::Text(text)) => (b.text != *text).then(|| {
            Block::Text(TextBlock {
                text: text.clone(),
                ..b.clone()
            })
        }),
        (Block::Image(b), BlockField::Src(src)) => (b.src != *src).then(|| {
            Block::Image(ImageBlock {
                src: src.clone(),
                ..b.clone()
            })
        }),
        (Block::Image(b), BlockField::AltText(alt)) => {
            (b.alt_text.as_deref() != Some(alt.as_str())).then(|| {
                Block::Image(ImageBlock {
                    alt_text: Some(alt.clone()),
                    ..b.clone()
                })
            })
        }
        (Block::Image(b), BlockField::Alignment(alignment)) => {
            (b.alignment() != *alignment).then(|| {
                Block::Image(ImageBlock {
                    stored_alignment: Some(*alignment),
                    ..b.clone()
                })
            })
        }
        _ => None,
    }
}

/// Collapse a `Cow` result into the replacement sequence, if any
pub fn changed(result: Cow<'_, [Block]>) -> Option<Vec<Block>> {
    match result {
        Cow::Owned(blocks) => Some(blocks),
        Cow::Borrowed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(role: &str, body: &str) -> Block {
        Block::Text(TextBlock {
            role: role.into(),
            text: body.into(),
        })
    }

    fn sample() -> Vec<Block> {
        vec![
            text("haggadah_main_hebrew", "הא לחמא עניא"),
            Block::new_image(),
            text("commentary_en", "Here we introduce the theme."),
        ]
    }

    #[test]
    fn append_returns_position_of_new_block() {
        let blocks = sample();
        let (next, index) = append(&blocks, Block::new_text());
        assert_eq!(index, 3);
        assert_eq!(next.len(), 4);
        assert_eq!(next[index], Block::new_text());
        assert_eq!(blocks.len(), 3, "input untouched");
    }

    #[test]
    fn remove_out_of_bounds_borrows_input() {
        let blocks = sample();
        assert!(matches!(remove_at(&blocks, 3), Cow::Borrowed(_)));
        assert!(matches!(remove_at(&[], 0), Cow::Borrowed(_)));
    }

    #[test]
    fn remove_keeps_order_of_the_rest() {
        let blocks = sample();
        let next = remove_at(&blocks, 1);
        assert_eq!(next.as_ref(), &[blocks[0].clone(), blocks[2].clone()]);
    }

    #[test]
    fn custom_choice_preserves_typed_role() {
        let blocks = vec![text("sidebar_note", "x"), text("", "y")];
        assert!(matches!(set_role_at(&blocks, 0, "custom"), Cow::Borrowed(_)));
        assert!(matches!(set_role_at(&blocks, 1, "custom"), Cow::Borrowed(_)));
    }

    #[test]
    fn preset_choice_replaces_role() {
        let blocks = sample();
        let next = set_role_at(&blocks, 0, "footnote_he");
        assert_eq!(next[0].role(), "footnote_he");
        assert_eq!(next[0].as_text().unwrap().text, "הא לחמא עניא");
    }

    #[test]
    fn image_field_on_text_block_is_ignored() {
        let blocks = sample();
        for field in [
            BlockField::Src("/images/fig1.jpg".into()),
            BlockField::AltText("caption".into()),
            BlockField::Alignment(ImageAlignment::Left),
        ] {
            assert!(matches!(set_field_at(&blocks, 0, &field), Cow::Borrowed(_)));
        }
    }

    #[test]
    fn text_field_on_image_block_is_ignored() {
        let blocks = sample();
        let result = set_field_at(&blocks, 1, &BlockField::Text("oops".into()));
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn writing_same_value_is_a_no_op() {
        let blocks = sample();
        let same = BlockField::Text("הא לחמא עניא".into());
        assert!(matches!(set_field_at(&blocks, 0, &same), Cow::Borrowed(_)));

        let same_alignment = BlockField::Alignment(ImageAlignment::Block);
        assert!(matches!(
            set_field_at(&blocks, 1, &same_alignment),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn image_fields_apply_to_image_block() {
        let blocks = sample();
        let next = set_field_at(&blocks, 1, &BlockField::Src("/images/fig1.jpg".into()));
        let next = set_field_at(&next, 1, &BlockField::Alignment(ImageAlignment::Right)).into_owned();

        let image = next[1].as_image().unwrap();
        assert_eq!(image.src, "/images/fig1.jpg");
        assert_eq!(image.alignment(), ImageAlignment::Right);
        assert_eq!(image.role, "archaeology_fig");
    }

    #[test]
    fn field_kinds() {
        assert!(BlockField::Role("x".into()).applies_to(BlockKind::Image));
        assert!(!BlockField::Text("x".into()).applies_to(BlockKind::Image));
        assert!(!BlockField::Src("x".into()).applies_to(BlockKind::Text));
    }

    #[test]
    fn changed_unwraps_owned_only() {
        let blocks = sample();
        assert!(changed(remove_at(&blocks, 9)).is_none());
        assert_eq!(changed(remove_at(&blocks, 0)).map(|b| b.len()), Some(2));
    }
}
