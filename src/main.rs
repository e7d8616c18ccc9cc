#![crate_type = "bin"]

#[macro_use]
extern crate log;

use skiplist_map::{SkipListMap, DEFAULT_ITERATION_PROBABILITY};

use std::process;

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();

    // Usage: skiplist-demo [probability] [count]
    let mut args = std::env::args().skip(1);
    let probability = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|err| {
            error!("probability {:?} is not a number: {}", arg, err);
            process::exit(2);
        }),
        None => DEFAULT_ITERATION_PROBABILITY,
    };
    let count: u32 = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|err| {
            error!("count {:?} is not a number: {}", arg, err);
            process::exit(2);
        }),
        None => 50,
    };

    let mut sk: SkipListMap<u32, u64> = match SkipListMap::with_probability(probability) {
        Ok(sk) => sk,
        Err(err) => {
            error!("{}", err);
            process::exit(2);
        }
    };

    let mut k = count;
    while k > 0 {
        if let Err(err) = sk.insert(k, u64::from(k) * u64::from(k)) {
            error!("insert {} failed: {}", k, err);
        }
        println!("{}", sk);
        k -= 1;
    }
    info!("{} keys over {} levels", sk.len(), sk.height());

    let k: u32 = 3;
    println!("{:?}", sk.get(&k));
    println!("{:?}", sk.remove(&k));
    println!("{:?}", sk.get(&k));
    println!("{}", sk);
}
