use super::Session;
use anyhow::Result;

pub fn prefs_command(session: &Session) -> Result<()> {
    println!(
        "📁 Preferences: {}",
        session.settings.preferences_path().display()
    );

    let suppressed = session.engine.preferences().suppressed();
    if suppressed.is_empty() {
        println!("   No prompts are suppressed");
        return Ok(());
    }
    for key in suppressed {
        println!("   • {}", key);
    }
    Ok(())
}
