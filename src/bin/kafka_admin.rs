use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use kafka_admin::admin::InMemoryCluster;
use kafka_admin::config::AdminSettings;
use kafka_admin::provisioning::ProvisioningOrchestrator;
use kafka_admin::readiness::{DEFAULT_PROBE_TIMEOUT, ReadinessProber, ReqwestTransport};
use kafka_admin::retry::{CancellationToken, PollInterrupt, PollingRetry};
use std::error::Error;
use std::process;
use std::sync::Arc;

type CliResult = Result<(), Box<dyn Error>>;

fn cli() -> Command {
    Command::new("kafka-admin")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Kafka topic provisioning and readiness checks")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Logs at debug level unless RUST_LOG says otherwise")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("probe")
                .about("Probe an HTTP endpoint once")
                .arg(
                    Arg::new("url")
                        .short('u')
                        .long("url")
                        .value_name("URL")
                        .help("Sets the URL to probe")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("await-registry")
                .about("Poll the schema registry until it is healthy")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the full startup gate against an in-memory cluster")
                .arg(config_arg())
                .arg(count_arg("brokers", "Sets the number of simulated brokers"))
                .arg(count_arg(
                    "create-failures",
                    "Fails the first N create requests",
                ))
                .arg(count_arg("list-failures", "Fails the first N list requests"))
                .arg(count_arg(
                    "visibility-lag",
                    "Hides new topics from the next N list requests",
                ))
                .arg(
                    Arg::new("reject-existing")
                        .long("reject-existing")
                        .help("Rejects creation of topics that already exist")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("skip-registry")
                        .long("skip-registry")
                        .help("Stops after the topics are verified")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets the settings file")
        .required(true)
}

fn count_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("N")
        .help(help)
        .value_parser(value_parser!(u32))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_settings(matches: &ArgMatches) -> Result<AdminSettings, Box<dyn Error>> {
    let path = matches
        .get_one::<String>("config")
        .ok_or("missing --config")?;
    Ok(AdminSettings::from_file(path)?)
}

fn probe(matches: &ArgMatches) -> Result<bool, Box<dyn Error>> {
    let url = matches.get_one::<String>("url").ok_or("missing --url")?;
    let prober = ReadinessProber::with_timeout(DEFAULT_PROBE_TIMEOUT)?;
    let outcome = prober.probe(url);
    println!("{} is {}", url, outcome);
    Ok(outcome.is_healthy())
}

fn await_registry(matches: &ArgMatches) -> CliResult {
    let settings = load_settings(matches)?;
    let url = settings.schema_registry_url();
    let prober = ReadinessProber::with_timeout(DEFAULT_PROBE_TIMEOUT)?;
    let token = CancellationToken::new();

    match PollingRetry::new(&settings.poll_budget()?)
        .poll_until(&token, |_| prober.probe(url).is_healthy())
    {
        Ok(probes) => {
            println!("Schema registry at {} is healthy after {} probe(s)", url, probes);
            Ok(())
        }
        Err(PollInterrupt::Exhausted { attempts }) => Err(format!(
            "Schema registry at {} is not healthy after {} probe(s)",
            url, attempts
        )
        .into()),
        Err(PollInterrupt::Cancelled { attempts }) => {
            Err(format!("Cancelled after {} probe(s)", attempts).into())
        }
    }
}

fn simulate(matches: &ArgMatches) -> CliResult {
    let settings = load_settings(matches)?;
    let count = |name: &str| matches.get_one::<u32>(name).copied();

    let brokers = count("brokers")
        .unwrap_or_else(|| u32::from(settings.kafka_config.replication_factor));
    let cluster = Arc::new(InMemoryCluster::for_target(&settings.cluster_target(), brokers));
    cluster.fail_next_creates(count("create-failures").unwrap_or(0));
    cluster.fail_next_lists(count("list-failures").unwrap_or(0));
    cluster.set_visibility_lag(count("visibility-lag").unwrap_or(0));
    cluster.set_reject_existing(matches.get_flag("reject-existing"));

    println!(
        "Simulating {} with {} broker(s)",
        cluster.target(),
        cluster.broker_count()
    );

    let mut orchestrator = ProvisioningOrchestrator::from_settings(
        &settings,
        cluster.clone(),
        ReqwestTransport::new(DEFAULT_PROBE_TIMEOUT)?,
        CancellationToken::new(),
    )?;

    let result = if matches.get_flag("skip-registry") {
        orchestrator.provision_topics()
    } else {
        orchestrator.initialize()
    };
    println!("State: {}", orchestrator.state());
    result?;

    for spec in orchestrator.topics() {
        if let Some(topic) = cluster.topic(spec.name()) {
            println!("{}", spec);
            for partition in &topic.partitions {
                println!(
                    "  partition {}: leader {}, replicas {:?}",
                    partition.id, partition.leader, partition.replicas
                );
            }
        }
    }
    println!(
        "create calls: {}, list calls: {}",
        cluster.create_calls(),
        cluster.list_calls()
    );
    Ok(())
}

fn main() {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("probe", probe_matches)) => match probe(probe_matches) {
            Ok(true) => Ok(()),
            Ok(false) => process::exit(1),
            Err(err) => Err(err),
        },
        Some(("await-registry", await_matches)) => await_registry(await_matches),
        Some(("simulate", simulate_matches)) => simulate(simulate_matches),
        _ => Err("Invalid command. Use --help for usage information.".into()),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
