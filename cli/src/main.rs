mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::BytesMut;
use clap::{Parser, CommandFactory};
use futures::StreamExt;

use tokio::io::AsyncRead;
use tokio_util::codec::{Encoder, FramedRead};

use isdnhdlc::{Codec, Config};

use cli::*;


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.config();

    tracing::debug!("using configuration: {:?}", config);

    match args.command {
        Command::Encode { frames, idle, output } => {
            cmd_encode(config, &frames, idle, output.as_deref()).await
        },
        Command::Decode { input, max_frame } => {
            if max_frame == 0 {
                use clap::error::ErrorKind;

                let mut cmd = Args::command();
                let err = cmd.error(
                    ErrorKind::InvalidValue,
                    "The maximum frame length must be at least one byte"
                );
                err.exit();
            }

            match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path).await
                        .with_context(|| format!("failed to open '{}'", path.display()))?;

                    cmd_decode(config, file, max_frame).await
                },
                None => {
                    tracing::debug!("no input specified, reading from stdin");
                    cmd_decode(config, tokio::io::stdin(), max_frame).await
                },
            }
        },
    }
}

async fn cmd_encode(config: Config, frames: &[PathBuf], idle: usize, output: Option<&Path>) -> Result<()> {
    let mut codec = Codec::new(config);
    let mut buf = BytesMut::new();

    codec.idle(&mut buf, idle);

    for path in frames {
        let data = tokio::fs::read(path).await
            .with_context(|| format!("failed to read frame from '{}'", path.display()))?;

        tracing::trace!("encoding {} byte frame from '{}'", data.len(), path.display());

        codec.encode(&data[..], &mut buf)
            .with_context(|| format!("failed to encode frame from '{}'", path.display()))?;

        codec.idle(&mut buf, idle);
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, &buf).await
                .with_context(|| format!("failed to write '{}'", path.display()))?;

            tracing::debug!("wrote {} bytes to '{}'", buf.len(), path.display());
        },
        None => {
            println!("{}", pretty_hex::pretty_hex(&buf));
        },
    }

    Ok(())
}

async fn cmd_decode<R>(config: Config, input: R, max_frame: usize) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let codec = Codec::with_capacity(config, max_frame);
    let mut stream = FramedRead::new(input, codec);

    tracing::debug!("decoding up to {} byte frames, 56k adaptation: {}",
        max_frame, stream.decoder().config().adapt56);

    let mut index = 0;
    while let Some(frame) = stream.next().await {
        let frame = frame?;

        println!("Frame {index}: {} bytes", frame.len());

        let data = pretty_hex::config_hex(
            &frame,
            pretty_hex::HexConfig {
                title: false,
                ..Default::default()
            },
        );

        for line in data.lines() {
            println!("  {}", line);
        }

        println!();
        index += 1;
    }

    let stats = stream.decoder().stats();

    println!("Statistics:");
    println!("  frames:         {}", stats.frames);
    println!("  framing errors: {}", stats.framing_errors);
    println!("  CRC errors:     {}", stats.crc_errors);
    println!("  length errors:  {}", stats.length_errors);

    Ok(())
}
