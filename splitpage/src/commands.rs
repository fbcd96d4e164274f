use crate::CLAP_STYLING;
use clap::{arg, command};
use splitpage_core::rewrite::{DEFAULT_LINK_HREF, DEFAULT_LINK_TEXT, DEFAULT_TITLE_TEXT};
use splitpage_fetch::DEFAULT_CATALOG_URL;

fn catalog_url_arg() -> clap::Arg {
    arg!(-c --"catalog-url" <URL>)
        .required(false)
        .help("Endpoint serving the JSON variant catalog")
        .default_value(DEFAULT_CATALOG_URL)
}

fn timeout_arg() -> clap::Arg {
    arg!(--"timeout" <SECONDS>)
        .required(false)
        .help("Outbound request timeout in seconds (default: no deadline)")
        .value_parser(clap::value_parser!(u64))
}

fn rewrite_args() -> [clap::Arg; 3] {
    [
        arg!(--"title-text" <TEXT>)
            .required(false)
            .help("Text placed inside <title>")
            .default_value(DEFAULT_TITLE_TEXT),
        arg!(--"link-href" <URL>)
            .required(false)
            .help("href written onto a#url")
            .default_value(DEFAULT_LINK_HREF),
        arg!(--"link-text" <TEXT>)
            .required(false)
            .help("Text written inside a#url")
            .default_value(DEFAULT_LINK_TEXT),
    ]
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("splitpage")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("splitpage")
        .styles(CLAP_STYLING)
        .arg(arg!(-v --"verbose" "Enable debug logging").required(false))
        .subcommand_required(true)
        .subcommand(
            command!("serve")
                .about("Serve a cookie-pinned random variant from the catalog for every request")
                .arg(
                    arg!(-l --"listen" <ADDR>)
                        .required(false)
                        .help("Address to listen on")
                        .value_parser(clap::value_parser!(std::net::SocketAddr))
                        .default_value("0.0.0.0:8787"),
                )
                .arg(catalog_url_arg())
                .arg(timeout_arg())
                .args(rewrite_args()),
        )
        .subcommand(
            command!("catalog")
                .about("Fetch the variant catalog once and print it")
                .arg(catalog_url_arg())
                .arg(timeout_arg()),
        )
        .subcommand(
            command!("preview")
                .about("Apply the HTML rewrite rules to a local file and print the result")
                .arg(
                    arg!(<FILE>)
                        .required(true)
                        .help("HTML file to rewrite")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .args(rewrite_args()),
        )
}
