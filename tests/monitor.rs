// tests/monitor.rs
mod common;

use std::future::{pending, ready};
use std::time::Duration;

use common::{init_tracing, root};
use tokio::time::sleep;

use devlaunch::exec::{CommandSpec, ExitInfo, ProcessBackend};
use devlaunch::launcher::launch;
use devlaunch::monitor::{MonitorOutcome, StopReport, monitor_processes};
use devlaunch::report::Console;
use devlaunch::supervisor::ServiceHandle;
use devlaunch::types::{LaunchPhase, Service};
use devlaunch_test_utils::builders::{
    LayoutBuilder, fake_context, healthy_toolchain, test_config, venv_python,
};
use devlaunch_test_utils::fake_backend::{FakeChild, FakeProcessBackend, FakeServer};

#[tokio::test(start_paused = true)]
async fn interrupt_stops_both_servers_exactly_once() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);

    let ctx = fake_context(config.clone(), backend.clone(), LayoutBuilder::complete(&config).build());
    let outcome = launch(&ctx, sleep(Duration::from_secs(30))).await;

    assert_eq!(outcome.phase, LaunchPhase::Stopped);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(
        outcome.monitor,
        Some(MonitorOutcome::Interrupted {
            stopped: vec![
                StopReport {
                    service: Service::Backend,
                    status: Some(ExitInfo::signalled()),
                },
                StopReport {
                    service: Service::Frontend,
                    status: Some(ExitInfo::signalled()),
                },
            ],
        })
    );

    for program in [venv_python(&config), "npm".into()] {
        let probe = backend.child(&program).unwrap();
        assert_eq!(probe.terminate_calls(), 1, "{}", program.display());
        assert_eq!(probe.wait_calls(), 1, "{}", program.display());
    }
}

#[tokio::test(start_paused = true)]
async fn backend_exit_leaves_the_frontend_running() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.server(
        venv_python(&config),
        FakeServer::ExitsAfterPolls { polls: 3, code: 1 },
    );

    let ctx = fake_context(config.clone(), backend.clone(), LayoutBuilder::complete(&config).build());
    let outcome = launch(&ctx, pending::<()>()).await;

    assert_eq!(outcome.phase, LaunchPhase::Failed);
    assert_eq!(outcome.exit_code(), 0, "a server dying after startup is not a launcher failure");
    assert_eq!(
        outcome.monitor,
        Some(MonitorOutcome::ProcessExited {
            service: Service::Backend,
            status: ExitInfo::from_code(1),
        })
    );

    let api = backend.child(venv_python(&config)).unwrap();
    assert_eq!(api.terminate_calls(), 0);

    let web = backend.child("npm").unwrap();
    assert_eq!(web.terminate_calls(), 0);
    assert_eq!(web.wait_calls(), 0);
    assert!(!web.has_exited());
}

#[tokio::test(start_paused = true)]
async fn frontend_exit_leaves_the_backend_running() {
    init_tracing();
    let config = test_config(&root());
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.server("npm", FakeServer::ExitsAfterPolls { polls: 2, code: 0 });

    let ctx = fake_context(config.clone(), backend.clone(), LayoutBuilder::complete(&config).build());
    let outcome = launch(&ctx, pending::<()>()).await;

    assert_eq!(outcome.exit_code(), 0);
    assert!(matches!(
        outcome.monitor,
        Some(MonitorOutcome::ProcessExited {
            service: Service::Frontend,
            ..
        })
    ));

    let api = backend.child(venv_python(&config)).unwrap();
    assert_eq!(api.terminate_calls(), 0);
    assert!(!api.has_exited());
}

#[tokio::test(start_paused = true)]
async fn survivor_is_stopped_when_configured() {
    init_tracing();
    let mut config = test_config(&root());
    config.stop_survivor_on_exit = true;
    let backend = FakeProcessBackend::new();
    healthy_toolchain(&backend, &config);
    backend.server(
        venv_python(&config),
        FakeServer::ExitsAfterPolls { polls: 2, code: 3 },
    );

    let ctx = fake_context(config.clone(), backend.clone(), LayoutBuilder::complete(&config).build());
    let outcome = launch(&ctx, pending::<()>()).await;

    assert_eq!(outcome.phase, LaunchPhase::Failed);

    let web = backend.child("npm").unwrap();
    assert_eq!(web.terminate_calls(), 1);
    assert_eq!(web.wait_calls(), 1);

    let api = backend.child(venv_python(&config)).unwrap();
    assert_eq!(api.terminate_calls(), 0, "an exited server is not terminated again");
}

fn spawn_handle(
    backend: &FakeProcessBackend,
    service: Service,
    program: &str,
) -> ServiceHandle<FakeChild> {
    let child = backend.spawn(&CommandSpec::new(program)).unwrap();
    ServiceHandle::new(service, child)
}

#[tokio::test(start_paused = true)]
async fn absent_handles_are_neither_polled_nor_reported() {
    init_tracing();
    let backend = FakeProcessBackend::new();
    backend.server("api", FakeServer::StaysUp);
    let mut api = spawn_handle(&backend, Service::Backend, "api");

    let outcome = monitor_processes(
        &Console::silent(),
        Some(&mut api),
        None,
        Duration::from_secs(1),
        ready(()),
    )
    .await;

    assert_eq!(
        outcome,
        MonitorOutcome::Interrupted {
            stopped: vec![StopReport {
                service: Service::Backend,
                status: Some(ExitInfo::signalled()),
            }],
        }
    );
}

#[tokio::test(start_paused = true)]
async fn monitor_polls_at_the_configured_interval() {
    init_tracing();
    let backend = FakeProcessBackend::new();
    backend.server("api", FakeServer::StaysUp);
    backend.server("web", FakeServer::StaysUp);
    let mut api = spawn_handle(&backend, Service::Backend, "api");
    let mut web = spawn_handle(&backend, Service::Frontend, "web");

    // First tick fires immediately, then one per second: t = 0, 1, 2, 3, 4.
    monitor_processes(
        &Console::silent(),
        Some(&mut api),
        Some(&mut web),
        Duration::from_secs(1),
        sleep(Duration::from_millis(4500)),
    )
    .await;

    assert_eq!(backend.child("api").unwrap().polls(), 5);
    assert_eq!(backend.child("web").unwrap().polls(), 5);
}

#[tokio::test]
async fn exited_handle_is_not_polled_again() {
    init_tracing();
    let backend = FakeProcessBackend::new();
    backend.server("api", FakeServer::ExitsAfterPolls { polls: 0, code: 1 });
    let mut api = spawn_handle(&backend, Service::Backend, "api");

    assert_eq!(api.poll().unwrap(), Some(ExitInfo::from_code(1)));
    assert_eq!(api.poll().unwrap(), Some(ExitInfo::from_code(1)));
    assert_eq!(api.stop().await.unwrap(), ExitInfo::from_code(1));

    let probe = backend.child("api").unwrap();
    assert_eq!(probe.polls(), 1);
    assert_eq!(probe.terminate_calls(), 0);
    assert_eq!(api.exit_status(), Some(ExitInfo::from_code(1)));
}
