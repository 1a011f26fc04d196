#![no_main]

use arbitrary::Arbitrary;
use blockalign::{
    AlignToken, AlignmentConfig, BlockRegistry, BlockType, Editor, EditorSettings, validate,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    wide_alignment: bool,
    all: bool,
    options: Vec<u8>,
    default: Option<u8>,
    clicks: Vec<u8>,
}

fn token(byte: u8) -> AlignToken {
    AlignToken::ALL[usize::from(byte) % AlignToken::ALL.len()]
}

fuzz_target!(|input: Input| {
    let settings = EditorSettings {
        wide_alignment: input.wide_alignment,
    };
    let mut config = if input.all {
        AlignmentConfig::all()
    } else {
        AlignmentConfig::only(input.options.iter().take(8).map(|&b| token(b)))
    };
    if let Some(default) = input.default {
        config = config.with_default(token(default));
    }

    let mut registry = BlockRegistry::new(settings);
    // Inconsistent declarations are rejected at registration.
    if registry
        .register(BlockType::new("fuzz/block", "Fuzz Block").alignment(config))
        .is_err()
    {
        return;
    }

    let mut editor = Editor::new(registry);
    editor.insert_block("fuzz/block").expect("registered");
    for &click in input.clicks.iter().take(16) {
        let token = token(click);
        let _ = editor.click(&token.label()).expect("toolbar and toggle agree");

        let pressed = editor.toolbar().iter().filter(|b| b.pressed).count();
        assert!(pressed <= 1);

        let markup = editor.edited_content();
        assert!(!markup.contains("alignnull"));
        let validated = validate(editor.registry(), &markup).expect("round trip");
        assert_eq!(
            validated.state,
            editor.blocks()[0].align_state(editor.registry())
        );
    }
});
