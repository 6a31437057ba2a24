use std::{env, error::Error, fs, path::Path, process};

use folio::application::render::{RenderRequest, RenderService, render_service};

const USAGE: &str = "usage: render_dump [--sanitize|--no-sanitize|--outline] <markdown_path>";

#[derive(Clone, Copy)]
enum Mode {
    Sanitized,
    Raw,
    Outline,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);

    let Some(first) = args.next() else {
        usage();
    };

    let (mode, path_arg) = match first.as_str() {
        "--sanitize" => (Mode::Sanitized, args.next()),
        "--no-sanitize" => (Mode::Raw, args.next()),
        "--outline" => (Mode::Outline, args.next()),
        _ => (Mode::Sanitized, Some(first)),
    };

    let Some(path_arg) = path_arg else {
        usage();
    };

    if args.next().is_some() {
        usage();
    }

    let markdown = fs::read_to_string(&path_arg)?;
    let article_id = Path::new(&path_arg)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("markdown-fixture")
        .to_owned();

    let renderer = render_service();
    let request = RenderRequest::new(article_id, markdown);

    match mode {
        Mode::Sanitized => println!("{}", renderer.render(&request)?.html),
        Mode::Raw => println!("{}", renderer.render_unsanitized(&request)?),
        Mode::Outline => {
            let output = renderer.render(&request)?;
            println!("{}", serde_json::to_string_pretty(&output.blocks)?);
        }
    }
    Ok(())
}

fn usage() -> ! {
    eprintln!("{USAGE}");
    process::exit(2);
}
