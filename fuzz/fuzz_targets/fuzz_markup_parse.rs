#![no_main]

use blockalign::{Editor, PluginManifest, parse_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    // Parsing must never panic.
    let _ = parse_document(text);

    let Ok(registry) = PluginManifest::align_hook_fixture().build_registry() else {
        return;
    };
    let mut editor = Editor::new(registry.clone());
    if editor.set_content(text).is_err() {
        return;
    }

    // Whatever was accepted must serialize to markup that parses again and
    // serializes identically from then on.
    let first = editor.edited_content();
    let mut reloaded = Editor::new(registry);
    reloaded
        .set_content(&first)
        .expect("serialized markup parses");
    assert_eq!(reloaded.blocks().len(), editor.blocks().len());
    for (before, after) in editor.blocks().iter().zip(reloaded.blocks()) {
        assert_eq!(after.is_valid(), before.is_valid(), "{first}");
    }
    assert_eq!(reloaded.edited_content(), first);
});
