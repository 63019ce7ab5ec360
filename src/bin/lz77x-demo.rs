use std::{
    env,
    error::Error,
    ffi::OsString,
    fs::File,
    io::{BufWriter, Write},
};

use lz77x::*;

#[cfg(feature = "std")]
fn self_test(inp: &[u8]) -> Result<(), Box<dyn Error>> {
    println!("Input length: {}", inp.len());

    let mut enc = vec![0u8; compressed_len(inp)?];
    let enc_len = compress_to_buf(inp, &mut enc)?;
    println!("Compressed length: {}", enc_len);

    if decompressed_len(&enc)? != inp.len() {
        return Err("decoded length differs from original".into());
    }
    let mut dec = vec![0u8; inp.len()];
    decompress_to_buf(&enc, &mut dec)?;
    if dec != inp {
        return Err("decoded data differs from original".into());
    }

    println!("Okay.");
    Ok(())
}

#[cfg(feature = "std")]
fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<OsString> = env::args_os().collect();

    if args.len() < 3 {
        println!("Usage: {} c|d input output", args[0].to_string_lossy());
        println!("       {} t input", args[0].to_string_lossy());
        return Ok(());
    }

    let mode = &args[1];
    let inp = std::fs::read(&args[2])?;

    let outp = match mode.to_str() {
        Some("t") => return self_test(&inp),
        Some("c") => compress_to_vec(&inp)?,
        Some("d") => decompress_to_vec(&inp, None)?,
        _ => {
            println!("Invalid mode {}", mode.to_string_lossy());
            return Ok(());
        }
    };

    let Some(outp_fn) = args.get(3) else {
        println!("Mode {} needs an output file", mode.to_string_lossy());
        return Ok(());
    };
    let mut outp_f = BufWriter::new(File::create(outp_fn)?);
    outp_f.write_all(&outp)?;
    outp_f.flush()?;

    Ok(())
}

#[cfg(not(feature = "std"))]
fn main() {
    println!("Demo requires std feature");
}
