//! エンジン子プロセスとの行単位の入出力

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::{EngineError, Result};

pub const ENGINE_QUIT_TIMEOUT: Duration = Duration::from_millis(300);
pub const ENGINE_QUIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// プロセス生成を直列化するロック。I/O には使わない。
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// プロトコルクライアントが使う行単位の送受信路。
///
/// 実装は 1 行送るたびに flush し、受信では空行を読み飛ばして末尾の空白を除いた行を返す。
pub trait LineChannel: Send {
    /// 1行 (改行なし) を送る
    fn send(&mut self, line: &str) -> Result<()>;

    /// 空でない行を1つ受け取る。`timeout` が `None` なら出力が閉じるまで待つ。
    fn receive_timeout(&mut self, timeout: Option<Duration>) -> Result<String>;

    fn receive(&mut self) -> Result<String> {
        self.receive_timeout(None)
    }

    /// プロセスとその子孫をまとめて強制終了する
    fn kill(&mut self) -> Result<()>;
}

/// 起動するエンジンのコマンドライン。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// true なら stderr を捨てる。false なら親の stderr に流す。
    pub silence_stderr: bool,
}

impl EngineCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// ログ用の表示文字列
    pub fn display(&self) -> String {
        let mut s = self.program.display().to_string();
        for arg in &self.args {
            s.push(' ');
            s.push_str(arg);
        }
        s
    }
}

/// 起動済みのエンジンプロセス。
///
/// stdout は専用スレッドが行ごとにキューへ転送するだけで、行の解釈はすべて
/// 呼び出し側スレッドで行う。送受信は呼び出し側から見て半二重。
pub struct ChildProcessChannel {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    rx: Receiver<String>,
    label: String,
}

impl ChildProcessChannel {
    pub fn spawn(command: &EngineCommand) -> Result<Self> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if command.silence_stderr { Stdio::null() } else { Stdio::inherit() });
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        detach_process_group(&mut cmd);

        let spawn_error = |source: io::Error| EngineError::Spawn {
            command: command.display(),
            source,
        };
        let mut child = {
            let _guard = SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            cmd.spawn().map_err(spawn_error)?
        };
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error(io::Error::new(io::ErrorKind::BrokenPipe, "no stdin")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error(io::Error::new(io::ErrorKind::BrokenPipe, "no stdout")))?;

        let label = command
            .program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| command.display());

        let (tx, rx) = mpsc::channel::<String>();
        let reader = std::thread::Builder::new()
            .name(format!("engine-reader-{label}"))
            .spawn(move || {
                let mut reader = BufReader::new(stdout);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            // 非 UTF-8 の出力でも読み続ける
                            let line = String::from_utf8_lossy(&buf).into_owned();
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                    }
                }
            });
        if let Err(e) = reader {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(e));
        }

        log::info!("{label}: started `{}` (pid {})", command.display(), child.id());
        Ok(Self {
            child,
            stdin: BufWriter::new(stdin),
            rx,
            label,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn wait_for_exit(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return true,
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(ENGINE_QUIT_POLL_INTERVAL)
                }
                _ => return false,
            }
        }
    }
}

impl LineChannel for ChildProcessChannel {
    fn send(&mut self, line: &str) -> Result<()> {
        log::debug!("{} << {}", self.label, line);
        self.stdin.write_all(line.as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;
        Ok(())
    }

    fn receive_timeout(&mut self, timeout: Option<Duration>) -> Result<String> {
        let deadline = timeout.map(|t| (Instant::now() + t, t));
        loop {
            let line = match deadline {
                Some((deadline, timeout)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(line) => line,
                        Err(RecvTimeoutError::Timeout) => {
                            return Err(EngineError::Timeout(timeout));
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(EngineError::EndOfStream);
                        }
                    }
                }
                None => self.rx.recv().map_err(|_| EngineError::EndOfStream)?,
            };
            let line = line.trim_end();
            log::debug!("{} >> {}", self.label, line);
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }
    }

    fn kill(&mut self) -> Result<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }
        log::warn!("{}: killing engine process group (pid {})", self.label, self.child.id());
        kill_process_group(&mut self.child)?;
        self.child.wait()?;
        Ok(())
    }
}

impl Drop for ChildProcessChannel {
    fn drop(&mut self) {
        if self.wait_for_exit(ENGINE_QUIT_TIMEOUT) {
            return;
        }
        let _ = kill_process_group(&mut self.child);
        let _ = self.child.wait();
    }
}

/// 親のシグナルが伝播しないよう、子を独立したプロセスグループで起動する。
#[cfg(unix)]
fn detach_process_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;

    // SAFETY: fork 後の子プロセスで async-signal-safe な setpgid のみを呼ぶ。
    unsafe {
        cmd.pre_exec(|| {
            if libc::setpgid(0, 0) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(windows)]
fn detach_process_group(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;

    cmd.creation_flags(windows_sys::Win32::System::Threading::CREATE_NEW_PROCESS_GROUP);
}

#[cfg(not(any(unix, windows)))]
fn detach_process_group(_cmd: &mut Command) {}

#[cfg(unix)]
fn kill_process_group(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: 自分が起動したプロセスグループへのシグナル送信のみ。
    let ret = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if ret == -1 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            // グループを作れていない場合に備えて本体だけでも落とす
            return child.kill().or(Err(err));
        }
    }
    Ok(())
}

#[cfg(windows)]
fn kill_process_group(child: &mut Child) -> io::Result<()> {
    use windows_sys::Win32::System::Console::{CTRL_BREAK_EVENT, GenerateConsoleCtrlEvent};

    // SAFETY: CREATE_NEW_PROCESS_GROUP で起動したグループ ID (= pid) に送る。
    let ok = unsafe { GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, child.id()) };
    if ok == 0 {
        return child.kill();
    }
    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn kill_process_group(child: &mut Child) -> io::Result<()> {
    child.kill()
}
