use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow, bail};
use chrono::{DateTime, Local, Utc};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use saveplate_client::orphanage::StockScope;
use saveplate_client::{ApiClient, ApiError, Poller, Shell};
use saveplate_core::session::{complete_oauth_redirect, nav_links};
use saveplate_core::{FileStore, Route, Session, forms, prefs};
use saveplate_types::{Role, UserProfile};
use saveplate_types::api::{
    ApproveFoodRequest, ConfirmDeliveryRequest, DonateItemRequest, RequestFoodRequest,
};

use crate::args::{Command, DarkModeArg};
use crate::config::Config;
use crate::render;

/// Countdown redraw period for the stock views.
const TICK: Duration = Duration::from_secs(1);
const CLEAR: &str = "\x1B[2J\x1B[H";

pub struct App {
    config: Config,
    session: Session,
    client: ApiClient,
}

impl App {
    pub fn open(config: Config) -> anyhow::Result<Self> {
        let session = Session::new(
            Arc::new(FileStore::open(config.local_store())),
            Arc::new(FileStore::open(config.session_store())),
        );
        let mut client = ApiClient::new(&config.api_url)
            .with_context(|| format!("bad API url {:?}", config.api_url))?;
        client.set_token(session.token()?);
        debug!(api = %config.api_url, state = %config.state_dir.display(), "app ready");
        Ok(Self {
            config,
            session,
            client,
        })
    }

    /// Print a failed command's error. A rejected token also ends the session.
    pub fn report(&self, err: &anyhow::Error) {
        match err.downcast_ref::<ApiError>() {
            Some(e) if e.is_unauthorized() => {
                if let Err(e) = self.session.invalidate() {
                    eprintln!("{e}");
                }
                eprintln!("Session expired. Please log in again.");
            }
            _ => eprintln!("{err:#}"),
        }
    }

    fn role(&self) -> anyhow::Result<Role> {
        self.session
            .role()?
            .filter(|_| self.client.token().is_some())
            .ok_or_else(|| anyhow!("not logged in; run `saveplate login` first"))
    }

    fn require(&self, role: Role) -> anyhow::Result<()> {
        let current = self.role()?;
        if current != role {
            bail!("this command is for {role} accounts, you are logged in as {current}");
        }
        self.session.context().navigate(role.dashboard_path())?;
        Ok(())
    }

    fn shell(&self) -> anyhow::Result<Shell> {
        Ok(Shell::new(self.role()?, self.client.clone(), self.session.clone()))
    }

    pub async fn run(&mut self, cmd: Command) -> anyhow::Result<()> {
        match cmd {
            Command::Login {
                email,
                password,
                role,
            } => {
                let route = self
                    .client
                    .sign_in(&self.session, &email, &password, role)
                    .await?;
                self.land(route)?;
            }
            Command::Register(args) => {
                let msg = self.client.register(&args.into_request()).await?;
                println!("{msg}");
            }
            Command::Google => println!("{}", self.client.google_sign_in_url()),
            Command::OAuth { redirect } => {
                let query = url::Url::parse(&redirect)
                    .ok()
                    .and_then(|u| u.query().map(str::to_string))
                    .unwrap_or(redirect);
                match complete_oauth_redirect(&query, &self.session)? {
                    Some(route) => {
                        self.client.set_token(self.session.token()?);
                        self.land(route)?;
                    }
                    None => println!("No token in the redirect. Use `saveplate login` instead."),
                }
            }
            Command::Logout => {
                let route = match self.shell() {
                    Ok(mut shell) => shell.logout()?,
                    Err(_) => self.session.logout()?,
                };
                self.client.set_token(None);
                println!("Logged out ({})", route.path());
            }
            Command::WhoAmI => {
                let mut shell = self.shell()?;
                match shell.check_identity().await? {
                    Some(profile) => {
                        println!("{}", render::profile(&profile, self.client.base_url()))
                    }
                    None => println!("Not logged in."),
                }
            }
            Command::Open { path } => {
                let context = self.session.context().navigate(&path)?;
                for (label, target) in nav_links(context) {
                    let mark = if target == path { ">" } else { " " };
                    println!("{mark} {label:<14} {target}");
                }
            }
            Command::DarkMode { mode } => {
                let role = self.role()?;
                let store = self.session.local();
                let on = match mode {
                    None => prefs::dark_mode(store, role)?,
                    Some(DarkModeArg::Toggle) => prefs::toggle_dark_mode(store, role)?,
                    Some(set) => {
                        let on = set == DarkModeArg::On;
                        prefs::set_dark_mode(store, role, on)?;
                        on
                    }
                };
                println!("dark mode {}", if on { "on" } else { "off" });
            }
            Command::Profile(args) => {
                self.role()?;
                let update = args.update();
                let profile = if update.fields().is_empty() && args.picture.is_none() {
                    self.client.me().await?
                } else {
                    self.client
                        .update_profile(&update, args.picture.as_deref())
                        .await?
                };
                println!("{}", render::profile(&profile, self.client.base_url()));
            }
            Command::ChangePassword { old, new, confirm } => {
                self.role()?;
                match forms::password_change(&old, &new, &confirm)? {
                    Some(req) => {
                        let msg = self.client.change_password(&req).await?;
                        println!("{}", msg.as_deref().unwrap_or("Password updated"));
                    }
                    None => println!("Nothing to change."),
                }
            }
            Command::Dashboard { watch } => self.dashboard(watch).await?,
            Command::Analytics => {
                let role = self.role()?;
                let donations = match role {
                    Role::Donor => self.client.my_donations().await?,
                    Role::Ngo => self.client.ngo_dashboard().await?,
                    Role::Orphanage => self.client.orphanage_dashboard().await?,
                };
                println!("{}", render::analytics(role, &donations, Local::now()));
            }
            Command::Notifications { watch } => self.notifications(watch).await?,
            Command::Resolve { id } => {
                self.role()?;
                let inbox = self.client.notifications().await?;
                let n = inbox
                    .notifications
                    .iter()
                    .find(|n| n.id == id)
                    .ok_or_else(|| anyhow!("no notification {id:?}"))?;
                if n.pending_action().is_none() {
                    println!("Nothing to do for this notification.");
                    return Ok(());
                }
                let msg = self.client.resolve(n).await?;
                println!("{}", msg.as_deref().unwrap_or("Done"));
            }
            Command::ClearNotifications => {
                self.role()?;
                self.client.clear_notifications().await?;
                println!("Notifications cleared.");
            }
            Command::Donate(args) => {
                self.require(Role::Donor)?;
                let req = args.into_form().into_request()?;
                let msg = self.client.create_donation(&req).await?;
                println!("{}", msg.as_deref().unwrap_or("Donation created"));
            }
            Command::Donations => {
                self.require(Role::Donor)?;
                println!("{}", render::donations(&self.client.my_donations().await?));
            }
            Command::ConfirmCompletion { id } => {
                self.require(Role::Donor)?;
                let msg = self.client.confirm_completion(&id).await?;
                println!("{}", msg.as_deref().unwrap_or("Pickup confirmed"));
            }
            Command::Pending => {
                self.require(Role::Ngo)?;
                let me = self.client.me().await?;
                let list = self.client.pending_donations(me.city.as_deref()).await?;
                println!("{}", render::donations(&list));
            }
            Command::Accept { id } => {
                self.require(Role::Ngo)?;
                let msg = self.client.accept_donation(&id).await?;
                println!("{}", msg.as_deref().unwrap_or("Donation accepted"));
            }
            Command::RequestCompletion { id } => {
                self.require(Role::Ngo)?;
                let msg = self.client.request_completion(&id).await?;
                println!("{}", msg.as_deref().unwrap_or("Completion requested"));
            }
            Command::Stock { watch } => {
                self.require(Role::Ngo)?;
                let items = self.client.ngo_food_stock().await?;
                if watch {
                    countdown(items, render::stock_table).await?;
                } else {
                    println!("{}", render::stock_table(&items, Utc::now()));
                }
            }
            Command::Orphanages => {
                self.require(Role::Ngo)?;
                let list = self.client.city_orphanages().await?;
                println!("{}", render::profiles(&list, self.client.base_url()));
            }
            Command::DonateItem {
                donation_id,
                item_index,
                orphanage_id,
            } => {
                self.require(Role::Ngo)?;
                let msg = self
                    .client
                    .donate_item(&DonateItemRequest {
                        donation_id,
                        item_index,
                        orphanage_id,
                    })
                    .await?;
                println!("{}", msg.as_deref().unwrap_or("Item donated"));
            }
            Command::ApproveRequest {
                donation_id,
                orphanage_id,
            } => {
                self.require(Role::Ngo)?;
                let msg = self
                    .client
                    .donate_to_orphanage(&ApproveFoodRequest {
                        donation_id,
                        orphanage_id,
                    })
                    .await?;
                println!("{}", msg.as_deref().unwrap_or("Request approved"));
            }
            Command::Deliveries => {
                self.require(Role::Ngo)?;
                println!("{}", render::deliveries(&self.client.deliveries().await?));
            }
            Command::DeliveryCompleted { id } => {
                self.require(Role::Ngo)?;
                let msg = self.client.delivery_completed(&id).await?;
                println!("{}", msg.as_deref().unwrap_or("Delivery marked complete"));
            }
            Command::RequestStock { out_of_city, watch } => {
                self.require(Role::Orphanage)?;
                let scope = if out_of_city {
                    StockScope::OutOfCity
                } else {
                    StockScope::SameCity
                };
                let ngos = self.client.ngo_stock(scope).await?;
                if watch {
                    countdown(ngos, render::ngo_stock).await?;
                } else {
                    println!("{}", render::ngo_stock(&ngos, Utc::now()));
                }
            }
            Command::RequestFood {
                donation_id,
                item_index,
                ngo_id,
            } => {
                self.require(Role::Orphanage)?;
                let msg = self
                    .client
                    .request_food(&RequestFoodRequest {
                        donation_id,
                        item_index,
                        ngo_id,
                    })
                    .await?;
                println!("{}", msg.as_deref().unwrap_or("Request sent"));
            }
            Command::ConfirmDelivery {
                donation_id,
                item_index,
            } => {
                self.require(Role::Orphanage)?;
                let msg = self
                    .client
                    .confirm_delivery(&ConfirmDeliveryRequest {
                        donation_id,
                        item_index,
                    })
                    .await?;
                println!("{}", msg.as_deref().unwrap_or("Delivery confirmed"));
            }
            Command::Stats => {
                let s = self.client.platform_stats().await?;
                println!(
                    "Donors {}   Meals {}   Orphanages {}",
                    s.total_donors, s.total_meals, s.total_orphanages
                );
            }
            Command::Partners => {
                self.role()?;
                let p = self.client.partners().await?;
                if let Some(city) = p.city.as_deref() {
                    println!("NGO partners in {city}");
                }
                println!("{}", render::profiles(&p.ngos, self.client.base_url()));
            }
            Command::Ngos => {
                let list = self.client.partner_ngos().await?;
                println!("{}", render::profiles(&list, self.client.base_url()));
            }
            Command::PublicOrphanages => {
                let list = self.client.public_orphanages().await?;
                println!("{}", render::profiles(&list, self.client.base_url()));
            }
        }
        Ok(())
    }

    fn land(&self, route: Route) -> anyhow::Result<()> {
        match route {
            Route::Dashboard(role) => {
                self.session.context().navigate(route.path())?;
                info!(%role, "signed in");
                println!("Logged in as {role}. Dashboard: {}", route.path());
            }
            Route::Login | Route::Landing => {
                println!("Sign-in did not produce a usable account. Please log in again.");
            }
        }
        Ok(())
    }

    async fn dashboard(&self, watch: bool) -> anyhow::Result<()> {
        let mut shell = self.shell()?;
        let role = shell.role();
        self.session.context().navigate(role.dashboard_path())?;
        let Some(profile) = shell.check_identity().await? else {
            bail!(ApiError::Unauthorized);
        };
        if !watch {
            return self.draw_dashboard(&shell, &profile).await;
        }
        let every = match role {
            Role::Orphanage => self.config.refresh,
            _ => self.config.poll,
        };
        let (shell, profile) = (&shell, &profile);
        repeat(every, tokio::signal::ctrl_c(), move || async move {
            print!("{CLEAR}");
            self.draw_dashboard(shell, profile).await
        })
        .await
    }

    async fn draw_dashboard(
        &self,
        shell: &Shell,
        profile: &UserProfile,
    ) -> anyhow::Result<()> {
        let now = Local::now();
        let text = match shell.role() {
            Role::Donor => {
                render::donor_dashboard(Some(profile), &self.client.my_donations().await?, now)
            }
            Role::Ngo => {
                let available = self.client.pending_donations(profile.city.as_deref()).await?;
                let accepted = self.client.ngo_dashboard().await?;
                render::ngo_dashboard(Some(profile), &available, &accepted, now)
            }
            Role::Orphanage => {
                render::orphanage_dashboard(Some(profile), &self.client.orphanage_dashboard().await?, now)
            }
        };
        let unread = match shell.refresh_unread().await {
            Ok(n) => n,
            Err(e) if !e.is_unauthorized() => {
                warn!(error = %e, "unread count not refreshed");
                shell.unread_count()
            }
            Err(e) => return Err(e.into()),
        };
        let theme = if shell.dark_mode()? { "dark" } else { "light" };
        println!("[{unread} unread] [{theme}]");
        println!("{text}");
        Ok(())
    }

    async fn notifications(&self, watch: bool) -> anyhow::Result<()> {
        let mut shell = self.shell()?;
        let list = shell.open_notifications().await?;
        println!("{}", render::notifications(&list));
        if !watch {
            return Ok(());
        }
        shell.start_polling(self.config.poll);
        let mut unread = shell.subscribe_unread();
        loop {
            tokio::select! {
                changed = unread.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let n = *unread.borrow_and_update();
                    println!("[{}] {n} unread", Local::now().format("%H:%M:%S"));
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
        shell.stop_polling();
        Ok(())
    }
}

/// Redraw a stock view every second until Ctrl-C. The data is fetched once;
/// only the countdowns move.
async fn countdown<T>(data: Vec<T>, view: fn(&[T], DateTime<Utc>) -> String) -> anyhow::Result<()>
where
    T: Send + Sync + 'static,
{
    println!("{CLEAR}{}", view(&data, Utc::now()));
    let data = Arc::new(data);
    let ticker = Poller::spawn(TICK, move || {
        let data = data.clone();
        async move {
            println!("{CLEAR}{}", view(data.as_slice(), Utc::now()));
        }
    });
    tokio::signal::ctrl_c().await?;
    ticker.stop();
    Ok(())
}

/// Run `draw` now and then every `every` until `stop` resolves. A failed
/// refresh is logged and retried on the next tick; only an expired session
/// or a local failure ends the loop.
async fn repeat<F, Fut>(
    every: Duration,
    stop: impl Future,
    mut draw: F,
) -> anyhow::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(stop);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = draw().await {
                    if !transient(&e) {
                        return Err(e);
                    }
                    warn!(error = %e, "refresh failed, retrying");
                }
            }
            _ = &mut stop => {
                debug!("interrupted");
                return Ok(());
            }
        }
    }
}

fn transient(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ApiError>(),
        Some(ApiError::Network(_) | ApiError::Rejected { .. })
    )
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use axum::extract::State;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use axum::Router;
    use axum::routing::get;

    use super::*;

    const JSON: [(header::HeaderName, &str); 1] = [(header::CONTENT_TYPE, "application/json")];

    /// Fails the first stats call, then answers normally.
    async fn flaky_stats(State(calls): State<Arc<AtomicU32>>) -> impl IntoResponse {
        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
            (StatusCode::INTERNAL_SERVER_ERROR, JSON, r#"{"message":"boom"}"#)
        } else {
            (StatusCode::OK, JSON, r#"{"totalDonors":1}"#)
        }
    }

    async fn expired() -> impl IntoResponse {
        (StatusCode::UNAUTHORIZED, JSON, r#"{"message":"Invalid token"}"#)
    }

    async fn spawn(calls: Arc<AtomicU32>) -> SocketAddr {
        let app = Router::new()
            .route("/api/stats", get(flaky_stats))
            .route("/api/notifications", get(expired))
            .with_state(calls);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn watch_survives_a_failed_refresh() {
        let calls = Arc::new(AtomicU32::new(0));
        let addr = spawn(calls.clone()).await;
        let client = ApiClient::new(&format!("http://{addr}")).unwrap();
        let drawn = AtomicU32::new(0);
        let (client, counter) = (&client, &drawn);

        let result = repeat(
            Duration::from_millis(20),
            tokio::time::sleep(Duration::from_millis(300)),
            move || async move {
                client.platform_stats().await?;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(())
            },
        )
        .await;

        assert!(result.is_ok());
        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(drawn.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn watch_stops_when_the_session_expires() {
        let addr = spawn(Arc::new(AtomicU32::new(0))).await;
        let client = ApiClient::new(&format!("http://{addr}"))
            .unwrap()
            .with_token("stale");
        let client = &client;

        let result = repeat(
            Duration::from_millis(20),
            tokio::time::sleep(Duration::from_secs(5)),
            move || async move {
                client.notifications().await?;
                Ok::<_, anyhow::Error>(())
            },
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)));
    }

    #[test]
    fn only_remote_failures_are_retried() {
        let rejected = anyhow::Error::from(ApiError::Rejected {
            status: 500,
            message: "boom".into(),
        });
        assert!(transient(&rejected));
        assert!(!transient(&anyhow::Error::from(ApiError::Unauthorized)));
        assert!(!transient(&anyhow!("disk full")));
    }
}
