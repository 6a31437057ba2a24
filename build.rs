use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use syntect::dumps::dump_to_uncompressed_file;
use syntect::highlighting::ThemeSet;
use syntect::html::{ClassStyle, css_for_theme_with_class_style};
use two_face::syntax;

const THEME_NAME: &str = "base16-ocean.dark";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(err) => panic!("OUT_DIR is not set: {err}"),
    };

    write_syntax_pack(&out_dir).expect("failed to prepare syntax pack");
    write_theme_css(&out_dir).expect("failed to prepare highlight stylesheet");
}

fn write_syntax_pack(out_dir: &Path) -> Result<(), String> {
    let syntax_set = syntax::extra_newlines();
    let pack_path = out_dir.join("syntaxes.packdump");
    dump_to_uncompressed_file(&syntax_set, &pack_path)
        .map_err(|err| format!("failed to encode syntax set: {err}"))?;

    println!("cargo:rustc-env=SYNTAX_PACK_FILE={}", pack_path.display());

    Ok(())
}

fn write_theme_css(out_dir: &Path) -> Result<(), String> {
    let theme_set = ThemeSet::load_defaults();
    let theme = theme_set
        .themes
        .get(THEME_NAME)
        .ok_or_else(|| format!("theme `{THEME_NAME}` not found"))?;

    let theme_css =
        css_for_theme_with_class_style(theme, ClassStyle::SpacedPrefixed { prefix: "syntax-" })
            .map_err(|err| err.to_string())?;

    let mut combined = String::with_capacity(theme_css.len() + 512);
    combined.push_str(&format!(
        "/* --- Syntect theme ({THEME_NAME}), generated at build time --- */\n"
    ));
    combined.push_str(&theme_css);
    combined.push_str(
        "\n.code-block-container { margin: 1.5rem 0; overflow-x: auto; border-radius: 6px; }\n\
         .code-block-container pre { margin: 0; padding: 1rem; }\n\
         .image-block { display: block; max-width: 100%; height: auto; margin: 1.5rem auto; }\n\
         .paragraph-block { line-height: 1.6; }\n\
         .table-block { border-collapse: collapse; margin: 1.5rem 0; }\n",
    );

    let css_path = out_dir.join("code.css");
    fs::write(&css_path, combined)
        .map_err(|err| format!("failed to write {}: {err}", css_path.display()))?;

    println!("cargo:rustc-env=SYNTAX_THEME_CSS_FILE={}", css_path.display());

    Ok(())
}
