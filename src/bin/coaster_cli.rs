fn main() {
    if let Err(err) = native::run() {
        eprintln!("coaster_cli error: {err}");
        std::process::exit(1);
    }
}

mod native {
    use coaster_engine::{Camera, Config, FixedClock, Point3, Track, TrackFileLoader};
    use serde::Serialize;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};
    use tracing_subscriber::EnvFilter;

    const USAGE: &str = r#"coaster_cli (coaster-engine)

USAGE:
  coaster_cli info <track> [options]
  coaster_cli ride <track> [--ticks <n>] [--dt <seconds>] [options]
  coaster_cli obj  <track> --out <path> [--overwrite] [options]

OPTIONS:
  --config <path>    JSON config with `track` and `camera` sections
  --ticks <n>        Number of simulated frames (ride, default 600)
  --dt <seconds>     Frame duration (ride, default 1/60)
  --out <path>       OBJ output path (obj)
  --overwrite        Overwrite an existing output file
  -v, --verbose      Debug logging (RUST_LOG overrides)
  -h, --help         Show this help
"#;

    const DEFAULT_TICKS: usize = 600;
    const DEFAULT_DT: f64 = 1.0 / 60.0;

    #[derive(Debug, Default)]
    struct Options {
        track: Option<PathBuf>,
        config: Option<PathBuf>,
        ticks: Option<usize>,
        dt: Option<f64>,
        out: Option<PathBuf>,
        overwrite: bool,
        verbose: bool,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };
        if matches!(command.as_str(), "-h" | "--help" | "help") {
            print_usage();
            return Ok(());
        }

        let options = parse_options(&mut args)?;
        init_logging(options.verbose);

        match command.as_str() {
            "info" => cmd_info(&options),
            "ride" => cmd_ride(&options),
            "obj" => cmd_obj(&options),
            other => Err(format!("unknown command: {other}\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        print!("{USAGE}");
    }

    fn init_logging(verbose: bool) {
        let default_level = if verbose { "debug" } else { "info" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        // A second init (tests, embedding) is harmless.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    fn parse_options(args: &mut Args) -> Result<Options, String> {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = Some(PathBuf::from(args.value("--config")?)),
                "--ticks" => {
                    let raw = args.value("--ticks")?;
                    let ticks: usize = raw
                        .parse()
                        .map_err(|e| format!("invalid --ticks {raw:?}: {e}"))?;
                    options.ticks = Some(ticks);
                }
                "--dt" => {
                    let raw = args.value("--dt")?;
                    let dt: f64 = raw.parse().map_err(|e| format!("invalid --dt {raw:?}: {e}"))?;
                    if !(dt.is_finite() && dt >= 0.0) {
                        return Err(format!("--dt must be a non-negative number, got {raw}"));
                    }
                    options.dt = Some(dt);
                }
                "--out" => options.out = Some(PathBuf::from(args.value("--out")?)),
                "--overwrite" => options.overwrite = true,
                "-v" | "--verbose" => options.verbose = true,
                flag if flag.starts_with('-') => return Err(format!("unknown option: {flag}")),
                path => {
                    if options.track.replace(PathBuf::from(path)).is_some() {
                        return Err("only one track file may be given".to_owned());
                    }
                }
            }
        }
        Ok(options)
    }

    fn load(options: &Options) -> Result<(Config, Track), String> {
        let config = match options.config.as_deref() {
            Some(path) => Config::load(path).map_err(|e| e.to_string())?,
            None => Config::default(),
        };
        let path = options
            .track
            .as_deref()
            .ok_or_else(|| format!("missing <track> argument\n\n{USAGE}"))?;
        let track = Track::load(&TrackFileLoader, path, &config.track).map_err(|e| e.to_string())?;
        Ok((config, track))
    }

    #[derive(Debug, Serialize)]
    struct TrackSummary {
        control_points: usize,
        max_s: usize,
        hmax: f64,
        arc_length: f64,
        vertices: usize,
        triangles: usize,
        rail_segments: usize,
        ties: usize,
        bounds_min: Option<[f64; 3]>,
        bounds_max: Option<[f64; 3]>,
        warnings: Vec<String>,
    }

    fn cmd_info(options: &Options) -> Result<(), String> {
        let (_, track) = load(options)?;
        let diag = track.diagnostics();
        let bounds = track.bounds();
        let summary = TrackSummary {
            control_points: track.control_points().len(),
            max_s: track.max_s(),
            hmax: track.hmax(),
            arc_length: track.arc_length(),
            vertices: diag.vertex_count,
            triangles: diag.triangle_count,
            rail_segments: diag.rail_segment_count,
            ties: diag.tie_count,
            bounds_min: bounds.map(|b| b.min.to_array()),
            bounds_max: bounds.map(|b| b.max.to_array()),
            warnings: diag.warnings.clone(),
        };
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("serialize summary: {e}"))?;
        println!("{json}");
        Ok(())
    }

    #[derive(Debug, Serialize)]
    struct RideSummary {
        ticks: usize,
        dt: f64,
        laps: u64,
        final_s: f64,
        min_speed: f64,
        max_speed: f64,
        final_position: [f64; 3],
    }

    fn cmd_ride(options: &Options) -> Result<(), String> {
        let (config, track) = load(options)?;
        let ticks = options.ticks.unwrap_or(DEFAULT_TICKS);
        let mut clock = FixedClock::new(options.dt.unwrap_or(DEFAULT_DT));

        let mut camera = Camera::new(Point3::ORIGIN, config.world_up(), &config.camera);
        camera.bind(&track);
        camera.set_on_track(true);

        let mut min_speed = f64::INFINITY;
        let mut max_speed = 0.0_f64;
        for _ in 0..ticks {
            camera.tick_with_clock(&mut clock, &track);
            min_speed = min_speed.min(camera.speed());
            max_speed = max_speed.max(camera.speed());
        }
        if ticks == 0 {
            min_speed = 0.0;
        }

        let summary = RideSummary {
            ticks,
            dt: clock.step(),
            laps: camera.laps(),
            final_s: camera.s(),
            min_speed,
            max_speed,
            final_position: camera.position().to_array(),
        };
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("serialize summary: {e}"))?;
        println!("{json}");
        Ok(())
    }

    fn cmd_obj(options: &Options) -> Result<(), String> {
        let out = options.out.as_deref().ok_or("obj requires --out <path>")?;
        let (_, track) = load(options)?;
        let name = options
            .track
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .unwrap_or("track");
        write_obj_file(out, &track, name, options.overwrite)?;
        eprintln!("wrote {}", out.display());
        Ok(())
    }

    fn write_obj_file(
        path: &Path,
        track: &Track,
        name: &str,
        overwrite: bool,
    ) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let vertices = track.mesh().vertices();

        writeln!(w, "# coaster-engine coaster_cli").map_err(|e| format!("write obj: {e}"))?;
        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;
        for v in vertices {
            let [x, y, z] = v.position;
            writeln!(w, "v {x} {y} {z}").map_err(|e| format!("write obj: {e}"))?;
        }
        for v in vertices {
            let [u, t] = v.tex_coords;
            writeln!(w, "vt {u} {t}").map_err(|e| format!("write obj: {e}"))?;
        }
        for v in vertices {
            let [x, y, z] = v.normal;
            writeln!(w, "vn {x} {y} {z}").map_err(|e| format!("write obj: {e}"))?;
        }

        // Track triangles wind clockwise about their normal; OBJ wants counter-clockwise.
        for tri in 0..vertices.len() / 3 {
            let a = tri * 3 + 1;
            let b = a + 1;
            let c = a + 2;
            writeln!(w, "f {a}/{a}/{a} {c}/{c}/{c} {b}/{b}/{b}")
                .map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush obj: {e}"))?;
        Ok(())
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
