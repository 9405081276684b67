use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use isdnhdlc::Config;


/// Encode and decode HDLC bitstreams of ISDN B- and D-channels
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Channel type, selects the inter-frame fill
    #[arg(short, long, global=true, value_enum, default_value_t=Channel::B)]
    pub channel: Channel,

    /// Use 56k rate adaptation (seven data bits per octet)
    #[arg(long, global=true)]
    pub adapt56: bool,

    /// Octets carry the first bit in the most significant position
    #[arg(long, global=true)]
    pub bit_reverse: bool,

    #[command(subcommand)]
    pub command: Command
}

impl Args {
    pub fn config(&self) -> Config {
        let config = match self.channel {
            Channel::B => Config::b_channel(),
            Channel::D => Config::d_channel(),
        };

        config
            .with_adapt56(self.adapt56)
            .with_bit_reverse(self.bit_reverse)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encode frames into a bitstream
    Encode {
        /// Files holding one frame payload each
        #[arg(required=true)]
        frames: Vec<PathBuf>,

        /// Fill octets to send ahead of and after each frame
        #[arg(long, default_value_t=0)]
        idle: usize,

        /// Write the raw bitstream to this file instead of printing it
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decode frames from a bitstream
    Decode {
        /// File holding the raw bitstream (standard input if unspecified)
        input: Option<PathBuf>,

        /// Maximum payload length accepted
        #[arg(long, default_value_t=4096)]
        max_frame: usize,
    },
}

#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Bearer channel, flags between frames
    B,

    /// Signalling channel, idle ones between frames
    D,
}
