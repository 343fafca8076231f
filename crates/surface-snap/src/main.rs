use surface_snap_lib::command::{execute_command, execute_json_batch, ToolCommand};
use surface_snap_lib::harness::TestHarness;
use surface_snap_lib::state::ToolSettings;

fn main() {
    let loaded = ToolSettings::load();
    let log_filter = match &loaded {
        Ok(settings) => settings.log_filter.clone(),
        Err(_) => ToolSettings::default().log_filter,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = loaded.unwrap_or_else(|e| {
        tracing::warn!("{e}");
        ToolSettings::default()
    });

    let mut harness = TestHarness::with_settings(settings);

    if let Some(scene) = parse_scene_arg() {
        if let Err(e) = harness.load_scene(&scene) {
            tracing::error!("Failed to load scene: {e}");
            std::process::exit(1);
        }
    }

    let responses = match parse_path_arg("--script").map(|p| read_file(&p)) {
        Some(Some(json)) => match execute_json_batch(&mut harness, &json) {
            Ok(responses) => responses,
            Err(e) => {
                tracing::error!("{e}");
                std::process::exit(1);
            }
        },
        Some(None) => std::process::exit(1),
        None => vec![execute_command(&mut harness, ToolCommand::Inspect)],
    };

    for response in responses {
        match serde_json::to_string(&response) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::error!("Failed to serialize response: {e}"),
        }
    }
}

fn parse_path_arg(flag: &str) -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn read_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!("Failed to read {path}: {e}");
            None
        }
    }
}

fn parse_scene_arg() -> Option<shared::SceneDescription> {
    let path = parse_path_arg("--scene")?;
    let json = read_file(&path)?;
    match serde_json::from_str::<shared::SceneDescription>(&json) {
        Ok(scene) => {
            tracing::info!("Loaded scene from {path} ({} objects)", scene.objects.len());
            Some(scene)
        }
        Err(e) => {
            tracing::error!("Failed to parse scene JSON from {path}: {e}");
            None
        }
    }
}
