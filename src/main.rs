use petal_ngin::SceneConfig;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1).as_deref() {
        Some("sunglass") => SceneConfig::sunglass(),
        Some("warrior") | None => SceneConfig::warrior(),
        Some(other) => anyhow::bail!("unknown preset '{other}', expected 'warrior' or 'sunglass'"),
    };
    petal_ngin::create_scene(config)
}
