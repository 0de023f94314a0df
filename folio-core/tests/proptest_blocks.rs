use std::borrow::Cow;

use folio_core::blocks::{append, remove_at, set_field_at, set_role_at, BlockField};
use folio_core::styles::{resolve_style, styles_for, StyleChoice, CUSTOM_STYLE_ID};
use folio_core::{
    Block, BlockKind, Document, EditorSession, ImageAlignment, ImageBlock, TextBlock,
};
use proptest::prelude::*;

fn arb_alignment() -> impl Strategy<Value = Option<ImageAlignment>> {
    prop::option::of(prop::sample::select(ImageAlignment::ALL.to_vec()))
}

// Roles mix presets, free-form keys and the empty string
fn arb_role() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(
            styles_for(BlockKind::Text)
                .iter()
                .chain(styles_for(BlockKind::Image))
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
        ),
        "[a-z_]{0,12}",
    ]
}

fn arb_block() -> impl Strategy<Value = Block> {
    prop_oneof![
        (arb_role(), ".{0,40}").prop_map(|(role, text)| Block::Text(TextBlock { role, text })),
        (
            arb_role(),
            "(/images/)?[a-z0-9]{0,10}",
            prop::option::of(".{0,20}"),
            arb_alignment()
        )
            .prop_map(|(role, src, alt_text, alignment)| {
                let mut block = Block::new_image();
                if let Block::Image(image) = &mut block {
                    *image = ImageBlock {
                        role,
                        src,
                        alt_text,
                        ..image.clone()
                    };
                }
                with_alignment(block, alignment)
            }),
    ]
}

fn with_alignment(block: Block, alignment: Option<ImageAlignment>) -> Block {
    // go through JSON so an absent alignment is exercised the way the wire sends it
    let mut value = serde_json::to_value(&block).unwrap();
    match alignment {
        Some(a) => value["alignment"] = serde_json::json!(a),
        None => {
            value.as_object_mut().unwrap().remove("alignment");
        }
    }
    serde_json::from_value(value).unwrap()
}

fn arb_blocks() -> impl Strategy<Value = Vec<Block>> {
    prop::collection::vec(arb_block(), 0..12)
}

fn open_session(blocks: Vec<Block>) -> EditorSession {
    let mut session = EditorSession::new();
    session.select_project("p");
    let ticket = session.begin_load("d").unwrap();
    session
        .finish_load(
            &ticket,
            Ok(Document {
                id: "d".into(),
                project_id: "p".into(),
                title: "Seder".into(),
                description: None,
                blocks,
            }),
        )
        .unwrap();
    session
}

proptest! {
    /// Property: removing what was just appended restores the sequence
    #[test]
    fn prop_append_then_remove_is_identity(blocks in arb_blocks(), block in arb_block()) {
        let (next, index) = append(&blocks, block);
        prop_assert_eq!(index, blocks.len());
        let back = remove_at(&next, index);
        prop_assert_eq!(back.as_ref(), blocks.as_slice());
    }

    /// Property: the custom sentinel never changes a role, even an empty one
    #[test]
    fn prop_custom_sentinel_preserves_role(blocks in arb_blocks(), index in 0usize..16) {
        let result = set_role_at(&blocks, index, CUSTOM_STYLE_ID);
        prop_assert!(matches!(result, Cow::Borrowed(_)));
    }

    /// Property: image-only fields never touch a text block
    #[test]
    fn prop_image_field_on_text_is_borrowed(blocks in arb_blocks(), src in "[a-z/]{1,10}") {
        let text_indices = blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.kind() == BlockKind::Text)
            .map(|(i, _)| i);
        for index in text_indices {
            for field in [
                BlockField::Src(src.clone()),
                BlockField::AltText(src.clone()),
                BlockField::Alignment(ImageAlignment::Right),
            ] {
                prop_assert!(matches!(set_field_at(&blocks, index, &field), Cow::Borrowed(_)));
            }
        }
    }

    /// Property: a present alignment survives, an absent one reads as block
    #[test]
    fn prop_alignment_defaults_to_block(block in arb_block()) {
        if let Block::Image(image) = &block {
            let json = serde_json::to_value(&block).unwrap();
            let expected = match json.get("alignment") {
                Some(value) => serde_json::from_value(value.clone()).unwrap(),
                None => ImageAlignment::Block,
            };
            prop_assert_eq!(image.alignment(), expected);
        }
    }

    /// Property: presets resolve to themselves, everything else is custom
    #[test]
    fn prop_resolve_is_exact(role in arb_role()) {
        for kind in [BlockKind::Text, BlockKind::Image] {
            let is_preset = styles_for(kind).iter().any(|e| e.id == role);
            match resolve_style(kind, &role) {
                StyleChoice::Preset(entry) => prop_assert!(is_preset && entry.id == role),
                StyleChoice::Custom => prop_assert!(!is_preset),
            }
        }
    }

    /// Property: removing a block before the active one keeps focus on the same block
    #[test]
    fn prop_active_follows_its_block(blocks in prop::collection::vec(arb_block(), 2..10), pick in any::<prop::sample::Index>()) {
        let active = 1 + pick.index(blocks.len() - 1);
        let expected = blocks[active].clone();

        let mut session = open_session(blocks);
        session.set_active(Some(active)).unwrap();
        session.remove_block(active - 1).unwrap();

        let open = session.open_document().unwrap();
        prop_assert_eq!(open.active(), Some(active - 1));
        prop_assert_eq!(open.active_block(), Some(&expected));
    }
}

#[test]
fn two_blocks_active_one_remove_zero() {
    let a = Block::new_text();
    let b = Block::new_image();
    let mut session = open_session(vec![a, b.clone()]);
    session.set_active(Some(1)).unwrap();
    session.remove_block(0).unwrap();

    let open = session.open_document().unwrap();
    assert_eq!(open.active(), Some(0));
    assert_eq!(open.active_block(), Some(&b));
}
