//! Send a few frames through an in-memory channel and print what arrives.
//!
//! Usage:
//!   cargo run --example loopback -- [b|d]

use anyhow::bail;

use bytes::Bytes;

use futures::{SinkExt, StreamExt};

use isdnhdlc::{Codec, Config};


#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt::init();

    // handle command line arguments
    let config = match std::env::args().nth(1).as_deref() {
        None | Some("b") => Config::b_channel(),
        Some("d") => Config::d_channel(),
        Some(other) => bail!("unknown channel '{other}', expected 'b' or 'd'"),
    };

    println!("Using {:?}", config);
    println!();

    let (a, b) = tokio::io::duplex(256);
    let mut tx = Codec::new(config).wrap(a);
    let mut rx = Codec::new(config).wrap(b);

    let frames = [
        Bytes::from_static(b"\x01\x02\x03"),
        Bytes::from_static(b"~~ flags inside ~~"),
        Bytes::from(vec![0xff; 40]),
    ];

    let send = async move {
        for frame in frames {
            tx.send(frame).await?;
        }
        SinkExt::<Bytes>::close(&mut tx).await?;

        Ok::<_, anyhow::Error>(())
    };

    let recv = async move {
        while let Some(frame) = rx.next().await {
            let frame = frame?;

            let data = pretty_hex::config_hex(
                &frame,
                pretty_hex::HexConfig {
                    title: false,
                    ..Default::default()
                },
            );

            println!("Frame ({} bytes):", frame.len());
            for line in data.lines() {
                println!("  {}", line);
            }
            println!();
        }

        println!("Stats: {:?}", rx.codec().stats());
        Ok::<_, anyhow::Error>(())
    };

    tokio::try_join!(send, recv)?;
    Ok(())
}
