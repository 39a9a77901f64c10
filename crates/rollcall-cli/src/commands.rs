//! Command dispatch: maps CLI subcommands onto the protocol operations

use rollcall_ble::{BleDiscoveryScanner, BroadcastEmitter};
use rollcall_core::identity::IdentityStore;
use rollcall_core::{
    Advertiser, ClassId, ClassRecord, Result, RollcallError, ScheduleSlot, SessionCandidate,
    SessionCode, SessionId, SessionStore, StudentId, StudentProfile, TeacherId, TeacherProfile,
    TimeSource,
};
use rollcall_runtime::{
    scan_for_session, watch_attendance, AppContext, DisabledAdvertiser, DisabledScanner,
    FileIdentityStore, SessionLifecycle,
};
use tracing::info;

use crate::cli::{ClassCommands, Commands, LoginCommands};

/// Execute one parsed command
pub async fn execute(
    command: Commands,
    no_radio: bool,
    ctx: &AppContext,
    identity: &FileIdentityStore,
) -> Result<()> {
    match command {
        Commands::StartSession { class_id } => start_session(ctx, class_id, no_radio).await,
        Commands::StopSession { code } => stop_session(ctx, code, no_radio).await,
        Commands::Scan => scan(ctx, no_radio).await.map(|_| ()),
        Commands::Attend => attend(ctx, identity, no_radio).await,
        Commands::FindLive => find_live(ctx).await,
        Commands::Watch { session_id } => watch(ctx, session_id).await,
        Commands::Sweep => sweep(ctx).await,
        Commands::Class(command) => class(ctx, identity, command).await,
        Commands::Login(command) => login(identity, command),
        Commands::Logout => identity.clear(),
    }
}

fn advertiser(no_radio: bool) -> Box<dyn Advertiser> {
    if no_radio {
        Box::new(DisabledAdvertiser)
    } else {
        Box::new(BroadcastEmitter::default())
    }
}

// ----------------------------------------------------------------------------
// Teacher Commands
// ----------------------------------------------------------------------------

async fn start_session(ctx: &AppContext, class_id: String, no_radio: bool) -> Result<()> {
    let mut lifecycle = SessionLifecycle::new(ctx.clone(), advertiser(no_radio));
    let started = lifecycle.start_session(&ClassId::new(class_id)).await?;

    println!("session started");
    println!("  id:      {}", started.session_id);
    println!("  code:    {}", started.session_code);
    println!("  expires: {}", started.expires_at);

    // stay resident for the validity window, surfacing attendance as it
    // lands; ctrl-c tears down early
    let watcher = watch_attendance(ctx, started.session_id.clone());
    let mut counts = watcher.subscribe();
    let window = started.expires_at.duration_since(ctx.time().now());
    let window_closed = tokio::time::sleep(window);
    tokio::pin!(window_closed);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
            _ = &mut window_closed => {
                println!("session window closed");
                break;
            }
            changed = counts.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("present: {}", *counts.borrow());
            }
        }
    }

    watcher.stop();
    lifecycle.stop_session(&started.session_code).await?;
    println!("session stopped");
    Ok(())
}

async fn stop_session(ctx: &AppContext, code: String, no_radio: bool) -> Result<()> {
    let code = SessionCode::parse(&code)?;
    let mut lifecycle = SessionLifecycle::new(ctx.clone(), advertiser(no_radio));
    lifecycle.stop_session(&code).await?;
    println!("session stopped");
    Ok(())
}

async fn watch(ctx: &AppContext, session_id: String) -> Result<()> {
    let watcher = watch_attendance(ctx, SessionId::new(session_id));
    let mut counts = watcher.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = counts.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("present: {}", *counts.borrow());
            }
        }
    }
    watcher.stop();
    Ok(())
}

async fn sweep(ctx: &AppContext) -> Result<()> {
    let purged = ctx.store().purge_expired(ctx.time().now()).await?;
    println!("purged {} expired rows", purged);
    Ok(())
}

// ----------------------------------------------------------------------------
// Student Commands
// ----------------------------------------------------------------------------

async fn scan(ctx: &AppContext, no_radio: bool) -> Result<SessionCandidate> {
    let candidate = if no_radio {
        let mut scanner = DisabledScanner;
        scan_for_session(ctx, &mut scanner).await?
    } else {
        let mut scanner = BleDiscoveryScanner::default();
        scan_for_session(ctx, &mut scanner).await?
    };

    println!("found session {} (via {:?})", candidate.code, candidate.source);
    Ok(candidate)
}

async fn attend(ctx: &AppContext, identity: &FileIdentityStore, no_radio: bool) -> Result<()> {
    let student = identity.load_student()?.ok_or_else(|| {
        RollcallError::identity("no student identity cached; run `rollcall login student` first")
    })?;

    let candidate = scan(ctx, no_radio).await?;

    // the candidate came through discovery, which is the one approved path
    match ctx.submitter().submit(&candidate.code, &student.id, true).await {
        Ok(receipt) => {
            println!("attendance recorded for session {}", receipt.session_id);
            Ok(())
        }
        Err(err) if err.is_duplicate() => {
            println!("attendance already recorded for this session");
            Ok(())
        }
        Err(err) => Err(err),
    }
}

async fn find_live(ctx: &AppContext) -> Result<()> {
    match ctx.fallback_resolver().find_live_session().await {
        Some(descriptor) => {
            println!("live session {}", descriptor.session_code);
            println!("  class:   {}", descriptor.class_id);
            println!("  expires: {}", descriptor.expires_at);
        }
        None => println!("no live session"),
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Class Registry Commands
// ----------------------------------------------------------------------------

async fn class(
    ctx: &AppContext,
    identity: &FileIdentityStore,
    command: ClassCommands,
) -> Result<()> {
    let teacher = identity.load_teacher()?.ok_or_else(|| {
        RollcallError::identity("no teacher identity cached; run `rollcall login teacher` first")
    })?;

    match command {
        ClassCommands::Add {
            name,
            subject,
            slots,
        } => {
            let schedule = slots
                .iter()
                .map(|slot| parse_slot(slot))
                .collect::<Result<Vec<_>>>()?;
            let class = ClassRecord::new(name, subject, teacher.id, schedule)?;
            ctx.store().insert_class(&class).await?;
            println!("class created");
            println!("  id:   {}", class.id);
            println!("  code: {}", class.class_code);
        }
        ClassCommands::List => {
            let classes = ctx.store().classes_for_teacher(&teacher.id).await?;
            if classes.is_empty() {
                println!("no classes");
            }
            for class in classes {
                println!(
                    "{}  {}  {}  {}{}",
                    class.id,
                    class.class_code,
                    class.subject,
                    class.name,
                    if class.is_active { "" } else { "  (inactive)" }
                );
            }
        }
        ClassCommands::Deactivate { class_id } => {
            let id = ClassId::new(class_id);
            let mut class = ctx
                .store()
                .class(&id)
                .await?
                .ok_or_else(|| RollcallError::config_error("no such class"))?;
            if class.teacher_id != teacher.id {
                return Err(RollcallError::config_error(
                    "class is owned by another teacher",
                ));
            }
            class.deactivate();
            ctx.store().update_class(&class).await?;
            println!("class {} deactivated", class.id);
        }
    }
    Ok(())
}

fn parse_slot(raw: &str) -> Result<ScheduleSlot> {
    let (day, time) = raw.split_once('@').ok_or_else(|| {
        RollcallError::config_error(format!("slot '{}' is not day@time", raw))
    })?;
    Ok(ScheduleSlot {
        day: day.to_string(),
        time: time.to_string(),
    })
}

// ----------------------------------------------------------------------------
// Identity Commands
// ----------------------------------------------------------------------------

fn login(identity: &FileIdentityStore, command: LoginCommands) -> Result<()> {
    match command {
        LoginCommands::Student {
            id,
            name,
            email,
            roll,
            batch,
        } => {
            let profile = StudentProfile {
                id: StudentId::new(id),
                name,
                email,
                roll_number: roll,
                batch,
            };
            identity.save_student(&profile)?;
            info!(student_id = %profile.id, "student identity cached");
        }
        LoginCommands::Teacher { id, name, email } => {
            let profile = TeacherProfile {
                id: TeacherId::new(id),
                name,
                email,
            };
            identity.save_teacher(&profile)?;
            info!(teacher_id = %profile.id, "teacher identity cached");
        }
    }
    Ok(())
}
