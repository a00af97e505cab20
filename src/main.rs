mod args;

use args::{ArgsError, Command, Query};
use colored::*;
use osmpbf_reader::{read_map, Error, Map, Way};
use std::fs::File;
use std::io::{self, BufReader, Read};

const HELP: &str = "\
osmpbfstat - query an OpenStreetMap PBF file

USAGE:
    osmpbfstat [-f PATH] -s
    osmpbfstat [-f PATH] -b
    osmpbfstat [-f PATH] -n ID
    osmpbfstat [-f PATH] -w ID [KEY...]
    osmpbfstat -h

FLAGS:
    -h           print this help and exit
    -f PATH      read the given PBF file (else read standard input)
    -s           print `nodes: N, ways: M`
    -b           print the bounding box in degrees
    -n ID        look up a node by id
    -w ID [KEY]  print a way's node references, or its tag values for KEY...
";

/// Formats a bbox coordinate: nanodegrees ÷ 1e9, nine decimal places (§6).
fn format_bbox_degrees(nanodegrees: i64) -> String {
    format!("{:.9}", nanodegrees as f64 / 1e9)
}

/// Formats a node coordinate: nanodegrees ÷ 1e7, seven decimal places (§6).
fn format_node_degrees(nanodegrees: i64) -> String {
    format!("{:.7}", nanodegrees as f64 / 1e7)
}

fn open_input(path: Option<&std::path::Path>) -> io::Result<Box<dyn Read>> {
    match path {
        Some(p) => Ok(Box::new(BufReader::new(File::open(p)?))),
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn print_summary(map: &Map) {
    println!("nodes: {}, ways: {}", map.node_count(), map.way_count());
}

fn print_bbox(map: &Map) {
    match map.bbox() {
        Some(bbox) => println!(
            "min_lon: {}, max_lon: {}, max_lat: {}, min_lat: {}",
            format_bbox_degrees(bbox.min_lon),
            format_bbox_degrees(bbox.max_lon),
            format_bbox_degrees(bbox.max_lat),
            format_bbox_degrees(bbox.min_lat),
        ),
        None => {}
    }
}

fn print_node(map: &Map, id: i64) {
    match map.find_node(id) {
        Some(node) => println!(
            "{}\t{} {}",
            node.id,
            format_node_degrees(node.lat),
            format_node_degrees(node.lon),
        ),
        None => println!("{}\tnot found", id),
    }
}

fn print_way(map: &Map, id: i64, keys: &[String]) {
    let way: &Way = match map.find_way(id) {
        Some(w) => w,
        None => {
            println!("{}\tnot found", id);
            return;
        }
    };

    if keys.is_empty() {
        let refs: Vec<String> = (0..way.ref_count())
            .map(|i| way.reference(i).unwrap().to_string())
            .collect();
        println!("{}\t{}", way.id, refs.join(" "));
    } else {
        let values: Vec<&str> = keys
            .iter()
            .filter_map(|k| way.value_for_key(k))
            .collect();
        println!("{}\t{}", way.id, values.join(" "));
    }
}

fn run(cmd: Command) -> Result<(), Error> {
    let mut reader = open_input(cmd.input.as_deref())?;
    let map = read_map(&mut reader)?;

    match cmd.query {
        Query::Help => unreachable!("Help is handled before run() is called"),
        Query::Summary => print_summary(&map),
        Query::BBox => print_bbox(&map),
        Query::Node(id) => print_node(&map, id),
        Query::Way(id, keys) => print_way(&map, id, &keys),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let cmd = match args::parse(&argv) {
        Ok(cmd) => cmd,
        Err(ArgsError(msg)) => {
            eprintln!("{}: {}", "Error".red(), msg);
            std::process::exit(1);
        }
    };

    if cmd.query == Query::Help {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if let Err(e) = run(cmd) {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
}
