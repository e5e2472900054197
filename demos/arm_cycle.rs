//! Example: Arm in stay mode, then disarm.

use alarmdotcom::{AlarmClient, ClientConfig, Command, PortalVariant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ClientConfig::builder()
        .username("user@example.com")
        .password("secret")
        .variant(PortalVariant::JsonApi)
        .build();

    let mut client = AlarmClient::new(config)?;

    if !client.login().await {
        println!("Login failed");
        return Ok(());
    }

    let status = client.poll_status().await?;
    println!("Current state: {}", status.state);
    if let Some(sensors) = status.sensor_status() {
        println!("Sensors: {}", sensors);
    }

    println!("\nArming in stay mode...");
    match client.dispatch(Command::ArmStay).await {
        Ok(state) => println!("Portal reports {}", state),
        Err(e) => println!("Error arming: {}", e),
    }

    // Wait a bit then disarm
    tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

    println!("\nDisarming...");
    match client.dispatch(Command::Disarm).await {
        Ok(state) => println!("Portal reports {}", state),
        Err(e) => println!("Error disarming: {}", e),
    }

    Ok(())
}
