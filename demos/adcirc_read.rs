//! Read ADCIRC station output, drop duplicate hot start records, reproject
//! to UTM zone 15 and print a station summary.
//!
//! Run with:
//! `cargo run --example adcirc_read -- fort_dup.61 stations.csv [fort.72.nc]`

use std::env;
use std::path::PathBuf;

use hmdf::{Date, HmdfData};

fn main() -> hmdf::Result<()> {
    hmdf::logging::init(false);

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        eprintln!("usage: adcirc_read <fort.61> <station file> [fort.72.nc]");
        std::process::exit(2);
    }
    let coldstart = Date::new(2019, 2, 5, 0, 0, 0)?;

    let mut m1 = HmdfData::new(&args[0], coldstart, Some(&args[1]));
    m1.read()?;
    m1.sanitize();
    m1.reproject(26915)?;

    match m1.station(1) {
        Some(s) => s.show(),
        None => eprintln!("{} has fewer than 2 stations", args[0]),
    }

    if let Some(wind) = args.get(2) {
        println!(" ");
        let mut m2 = HmdfData::new(wind, coldstart, None::<PathBuf>);
        m2.read()?;
        if let Some(s) = m2.station(2) {
            s.show();
        }
    }

    Ok(())
}
