//! Session operations against scripted fake devices.

mod support;

use std::time::Duration;

use secrecy::SecretString;
use termfleet::{CaptureMode, Credentials, EnableOptions, Error, LoginOptions, SessionError};

use support::{login_privileged, open_session, ScriptedDevice, Step};

const TIMEOUT: Duration = Duration::from_secs(2);

fn creds() -> Credentials {
    Credentials::new("op", "pw")
}

#[tokio::test]
async fn login_against_immediately_privileged_device() {
    let device = ScriptedDevice::spawn(login_privileged()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    assert!(session.is_privileged());

    session.disconnect(false).await;
    // Exactly username, password, banner flush - no retry nudges.
    assert_eq!(device.finish().await, "op\rpw\r\r");
}

#[tokio::test]
async fn login_lands_unprivileged_and_reports_it() {
    let device = ScriptedDevice::spawn(vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("\r\nswitch-1>"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "sw1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    assert!(!session.is_privileged());
}

#[tokio::test]
async fn login_declines_setup_wizard_and_terminates_autoinstall() {
    let device = ScriptedDevice::spawn(vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("Would you like to enter the initial configuration dialog? [yes/no]: "),
        Step::Expect("no\r"),
        Step::Send("Would you like to terminate autoinstall? [yes]: "),
        Step::Expect("yes\r"),
        Step::Send("\r\nswitch-1>"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "sw1", dir.path(), TIMEOUT).await;

    let options = LoginOptions {
        attempts: 2,
        retry_interval: Duration::from_millis(50),
    };
    session.login(&creds(), &options).await.unwrap();
    assert!(!session.is_privileged());
}

#[tokio::test]
async fn login_exits_config_mode_before_returning() {
    let device = ScriptedDevice::spawn(vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter(config-if)#"),
        Step::Expect("end\r"),
        Step::Send("\r\nrouter#"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    assert!(session.is_privileged());
}

#[tokio::test]
async fn login_gives_up_after_silent_attempts() {
    let device = ScriptedDevice::spawn(vec![
        Step::Send("\r\nUsername: "),
        Step::Expect("op\r"),
        Step::Send("Password: "),
        Step::Expect("pw\r"),
        // Then nothing: the device never presents a prompt.
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session =
        open_session(&device, "r1", dir.path(), Duration::from_millis(300)).await;

    let options = LoginOptions {
        attempts: 2,
        retry_interval: Duration::from_millis(50),
    };
    let err = session.login(&creds(), &options).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::LoginFailed { .. })
    ));
    assert!(!session.is_privileged());
}

#[tokio::test]
async fn enable_is_idempotent_when_already_privileged() {
    let device = ScriptedDevice::spawn(vec![
        Step::Expect("\r"),
        Step::Send("\r\nrouter#"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    let passwords = vec![SecretString::from("secret".to_string())];
    let options = EnableOptions {
        attempts: 2,
        disable_paging: false,
    };
    session.enable(&passwords, &options).await.unwrap();
    assert!(session.is_privileged());

    session.disconnect(false).await;
    // Only the fresh-prompt return; no password was consumed.
    assert_eq!(device.finish().await, "\r");
}

#[tokio::test]
async fn enable_escalates_with_password_and_disables_paging() {
    let device = ScriptedDevice::spawn(vec![
        Step::Expect("\r"),
        Step::Send("\r\nrouter>"),
        Step::Expect("enable\r"),
        Step::Send("Password: "),
        Step::Expect("secret\r"),
        Step::Send("\r\nrouter#"),
        Step::Expect("terminal length 0\r"),
        Step::Send("\r\nrouter#"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    let passwords = vec![SecretString::from("secret".to_string())];
    session
        .enable(&passwords, &EnableOptions::default())
        .await
        .unwrap();
    assert!(session.is_privileged());
}

#[tokio::test]
async fn enable_exhausts_password_candidates_and_fails() {
    let device = ScriptedDevice::spawn(vec![
        Step::Expect("\r"),
        Step::Send("\r\nrouter>"),
        Step::Expect("enable\r"),
        Step::Send("Password: "),
        Step::Expect("first\r"),
        Step::Send("Password: "),
        Step::Expect("second\r"),
        Step::Send("Password: "),
        // Third prompt triggers the terminal send of candidate two.
        Step::Expect("second\r"),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    let passwords = vec![
        SecretString::from("first".to_string()),
        SecretString::from("second".to_string()),
        SecretString::from("never-used".to_string()),
    ];
    let err = session
        .enable(&passwords, &EnableOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::EnableFailed { .. })
    ));

    session.disconnect(true).await;
    let received = device.finish().await;
    // Only the first two candidates are ever tried.
    assert!(!received.contains("never-used"));
}

#[tokio::test]
async fn factory_reset_sends_the_exact_dialog_sequence() {
    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("delete flash:vlan.dat\r"),
        Step::Send("Delete filename [vlan.dat]? "),
        Step::Expect("\r"),
        Step::Send("Delete flash:vlan.dat? [confirm]"),
        Step::Expect("\r"),
        Step::Send("\r\nrouter#"),
        Step::Expect("erase startup-config\r"),
        Step::Send("Erasing the nvram filesystem will remove all configuration files! Continue? [confirm]"),
        Step::Expect("\r"),
        Step::Send("[OK]\r\nErase of nvram: complete\r\nrouter#"),
        Step::Expect("reload\r"),
        Step::Send("System configuration has been modified. Save? [yes/no]: "),
        Step::Expect("no\r"),
        Step::Send("Proceed with reload? [confirm]"),
        Step::Expect("\r"),
        Step::Send("\r\nReload requested by console.\r\n"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    session.factory_reset(true).await.unwrap();
    session.disconnect(false).await;

    // The full reset dialog, byte for byte: delete, return, return,
    // erase, return, reload, no, return - nothing else.
    let received = device.finish().await;
    assert_eq!(
        received,
        concat!(
            "op\rpw\r\r",
            "delete flash:vlan.dat\r",
            "\r",
            "\r",
            "erase startup-config\r",
            "\r",
            "reload\r",
            "no\r",
            "\r",
        )
    );
}

#[tokio::test]
async fn factory_reset_requires_privilege() {
    let device = ScriptedDevice::spawn(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    let err = session.factory_reset(false).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::ResetFailed { .. })
    ));
}

#[tokio::test]
async fn accurate_capture_concatenates_across_intermediate_timeouts() {
    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("show version\r"),
        Step::Send("Cisco IOS Software, Version 12.4\r\n"),
        Step::Pause(Duration::from_millis(600)),
        Step::Send("uptime is 2 weeks\r\n"),
        Step::Pause(Duration::from_millis(400)),
        Step::Send("Configuration register is 0x2102\r\nrouter#"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();

    let output = session
        .send_command(
            "show version",
            CaptureMode::Accurate {
                interval: Duration::from_millis(400),
            },
        )
        .await
        .unwrap();

    // The exact bytes observed before the final prompt, with no trace of
    // how many windows timed out along the way.
    assert_eq!(
        output,
        "Cisco IOS Software, Version 12.4\r\nuptime is 2 weeks\r\nConfiguration register is 0x2102\r\n"
    );
}

#[tokio::test]
async fn fast_capture_stops_at_the_first_prompt() {
    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("show clock\r"),
        Step::Send("12:00:00.000 UTC\r\nrouter#"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    let output = session
        .send_command("show clock", CaptureMode::Fast)
        .await
        .unwrap();
    assert_eq!(output, "12:00:00.000 UTC\r\n");
}

#[tokio::test]
async fn push_config_on_comments_only_file_sends_no_lines() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("r1.cfg"), "! archive header\n!\n\n   \n").unwrap();

    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("configure terminal\r"),
        Step::Send("\r\nrouter(config)"),
        Step::Expect("end\r"),
        Step::Send("\r\nrouter#"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    session.push_config(None).await.unwrap();
    session.disconnect(false).await;

    // Enters and exits configuration mode with zero payload lines.
    assert_eq!(
        device.finish().await,
        "op\rpw\r\rconfigure terminal\rend\r"
    );
}

#[tokio::test]
async fn push_config_missing_file_fails_before_config_mode() {
    let device = ScriptedDevice::spawn(login_privileged()).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    let err = session.push_config(None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Session(SessionError::MissingConfigFile { .. })
    ));

    session.disconnect(false).await;
    assert!(!device.finish().await.contains("configure terminal"));
}

#[tokio::test]
async fn push_config_stops_cleanly_when_device_leaves_config_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("r1.cfg"),
        "hostname r1\nline console 0\nlogging synchronous\n",
    )
    .unwrap();

    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("configure terminal\r"),
        Step::Send("\r\nrouter(config)"),
        Step::Expect("hostname r1\r"),
        Step::Send("\r\nr1(config)"),
        Step::Expect("line console 0\r"),
        // Device drops out of configuration mode on its own here.
        Step::Send("\r\nr1#"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    session.push_config(None).await.unwrap();
    assert!(session.is_privileged());

    session.disconnect(false).await;
    let received = device.finish().await;
    // The line after the early exit is never sent, and no `end` follows.
    assert!(!received.contains("logging synchronous"));
    assert!(!received.contains("end\r"));
}

#[tokio::test]
async fn save_config_archives_the_running_configuration() {
    let mut steps = login_privileged();
    steps.extend(vec![
        Step::Expect("show running-config\r"),
        Step::Send("hostname router\r\n!\r\nend\r\nrouter#"),
    ]);
    let device = ScriptedDevice::spawn(steps).await;
    let dir = tempfile::tempdir().unwrap();
    let mut session = open_session(&device, "r1", dir.path(), TIMEOUT).await;

    session
        .login(&creds(), &LoginOptions::default())
        .await
        .unwrap();
    let path = session.save_config().await.unwrap();

    assert_eq!(
        path,
        dir.path().join("config_archive").join("test-run").join("r1.cfg")
    );
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "hostname router\r\n!\r\nend\r\n"
    );
}
