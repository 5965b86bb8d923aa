//! EMU101 assembler CLI: `emu101asm SRC DST` compiles mnemonic source into
//! a flat big-endian word stream.

use std::process;

use emu101_asm::Assembler;

fn parse_args() -> Result<(String, String), &'static str> {
    let args: Vec<String> = std::env::args().collect();
    match args.as_slice() {
        [_, src, dst] => Ok((src.clone(), dst.clone())),
        _ => Err("usage: emu101asm SRC DST"),
    }
}

fn main() {
    let (src_path, dst_path) = match parse_args() {
        Ok(paths) => paths,
        Err(usage) => {
            eprintln!("{usage}");
            process::exit(2);
        }
    };

    let source = match std::fs::read_to_string(&src_path) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let bytes = match Assembler::default().assemble(&source) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    if let Err(err) = std::fs::write(&dst_path, bytes) {
        eprintln!("{err}");
        process::exit(1);
    }
}
