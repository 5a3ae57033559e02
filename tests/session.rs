use std::{sync::Arc, time::Duration};

use color_eyre::Result;
use pretty_assertions::assert_eq;
use superres_scripts::{
    error::Error,
    script::ScriptTable,
    session::{Session, INVALID_INDEX, PROMPT},
};
use superres_scripts::console::Console;
use tokio::{
    io::{AsyncWriteExt, BufReader},
    sync::Notify,
    time::sleep,
};

mod common;

#[tokio::test]
async fn bad_index_reprompts_and_sends_nothing() -> Result<()> {
    let (connection, mut device) = common::connect();
    let console = common::console("abc\n99\n-1\n");

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        Arc::new(Notify::new()),
    );

    session.run().await?;

    let printed = common::printed(session.console());
    assert_eq!(printed.matches(INVALID_INDEX).count(), 3);
    assert_eq!(printed.matches(PROMPT).count(), 4);

    assert!(common::drain(&mut device).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn valid_index_sends_then_echoes_then_prompts_again() -> Result<()> {
    let (connection, mut device) = common::connect();
    let console = common::console("abc\n3\n");

    device.write_all(b"SEQ STARTED\r\n").await?;

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        Arc::new(Notify::new()),
    )
    .with_echo_idle_timeout(Some(Duration::from_millis(100)));

    session.run().await?;

    assert_eq!(
        common::printed(session.console()),
        [
            PROMPT,
            INVALID_INDEX,
            "\n",
            PROMPT,
            "1> on, SET_STATE_CLK\n",
            "2> START_SEQ\n",
            "SEQ STARTED\n",
            PROMPT,
        ]
        .concat()
    );

    assert_eq!(
        common::drain(&mut device).await,
        b"on, SET_STATE_CLK\nSTART_SEQ\n"
    );

    Ok(())
}

#[tokio::test]
async fn echo_without_timeout_never_gives_back_the_prompt() -> Result<()> {
    let (connection, mut device) = common::connect();
    let console = common::console("1\n2\n");

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        Arc::new(Notify::new()),
    );

    let still_running = tokio::time::timeout(Duration::from_millis(500), session.run()).await;
    assert!(still_running.is_err());

    // Only the first script made it out, the second answer was never read.
    let table = ScriptTable::builtin();
    assert_eq!(
        common::drain(&mut device).await,
        common::wire_bytes(table.get(1).unwrap())
    );
    assert_eq!(common::printed(session.console()).matches(PROMPT).count(), 1);

    Ok(())
}

#[tokio::test]
async fn interrupt_returns_to_prompt() -> Result<()> {
    let (connection, mut device) = common::connect();
    let console = common::console("2\n5\n");
    let interrupt = Arc::new(Notify::new());

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        interrupt.clone(),
    );

    let operator = async {
        // One interrupt per echo.
        for _ in 0..2 {
            sleep(Duration::from_millis(200)).await;
            interrupt.notify_one();
        }
    };

    let (result, ()) = tokio::join!(session.run(), operator);
    result?;

    let table = ScriptTable::builtin();
    let expected = [
        common::wire_bytes(table.get(2).unwrap()),
        common::wire_bytes(table.get(5).unwrap()),
    ]
    .concat();

    assert_eq!(common::drain(&mut device).await, expected);
    assert_eq!(common::printed(session.console()).matches(PROMPT).count(), 3);

    Ok(())
}

#[tokio::test]
async fn device_disconnect_ends_session() -> Result<()> {
    let (connection, mut device) = common::connect();
    let console = common::console("3\n1\n");

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        Arc::new(Notify::new()),
    );

    let device_side = async move {
        let received = common::drain(&mut device).await;
        drop(device);
        received
    };

    let (result, received) = tokio::join!(session.run(), device_side);

    assert!(matches!(result, Err(Error::Disconnected)));
    assert_eq!(received, b"on, SET_STATE_CLK\nSTART_SEQ\n");

    Ok(())
}

#[tokio::test]
async fn configured_scripts_replace_builtin() -> Result<()> {
    let config = superres_scripts::config::Config::example();

    let (connection, mut device) = common::connect();
    let console = common::console("1\n");

    let mut session = Session::new(
        connection,
        config.script_table(),
        console,
        Arc::new(Notify::new()),
    )
    .with_echo_idle_timeout(Some(Duration::from_millis(50)));

    session.run().await?;

    assert_eq!(
        common::drain(&mut device).await,
        b"on, SET_STATE_CLK\nSTART_SEQ\n"
    );

    Ok(())
}

#[tokio::test]
async fn interrupt_at_prompt_ends_session() -> Result<()> {
    let (connection, mut device) = common::connect();

    // The operator never types anything, and never closes the input either.
    let (_operator_keyboard, input) = tokio::io::duplex(64);
    let console = Console::new(BufReader::new(input), Vec::new());

    let interrupt = Arc::new(Notify::new());

    let mut session = Session::new(
        connection,
        ScriptTable::builtin(),
        console,
        interrupt.clone(),
    );

    let ctrl_c = async {
        sleep(Duration::from_millis(200)).await;
        interrupt.notify_one();
    };

    let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(session.run(), ctrl_c)
    })
    .await?;
    result?;

    assert_eq!(common::printed(session.console()), PROMPT);
    assert!(common::drain(&mut device).await.is_empty());

    Ok(())
}
