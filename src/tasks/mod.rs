//! Background scheduled tasks for the application.
//!
//! Two recurring jobs: sweeping pending payouts into batches, and
//! executing draws whose window has closed. Call `spawn_all` once
//! during startup to launch whichever are enabled in config.

use crate::config::BatchConfig;
use crate::error::AppError;
use crate::services::{DrawService, PayoutService};

/// Spawn enabled background tasks.
///
/// Notes
/// - Both sweeps rely on conditional updates in the services, so a
///   concurrently triggered manual run can never double-pay or redraw.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(config: &BatchConfig, payout_service: PayoutService, draw_service: DrawService) {
    // 打款扫描: 认领一页 pending 并处理
    if config.sweep_interval_secs > 0 {
        let svc = payout_service.clone();
        let interval = config.sweep_interval_secs;
        let page_size = config.sweep_page_size;
        tokio::spawn(async move {
            loop {
                match svc.sweep_once(page_size).await {
                    Ok(n) if n > 0 => log::info!("payout sweep processed {n} payouts"),
                    Ok(_) => {}
                    Err(e) => log::error!("payout sweep failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            }
        });
    }

    // 开奖扫描: 窗口已关闭且未开出的抽奖期
    if config.draw_sweep_interval_secs > 0 {
        let svc = draw_service.clone();
        let interval = config.draw_sweep_interval_secs;
        tokio::spawn(async move {
            loop {
                match svc.pending_draw_ids().await {
                    Ok(ids) => {
                        for draw_id in ids {
                            match svc.execute_draw(draw_id).await {
                                Ok(result) => log::info!(
                                    "draw sweep settled draw {draw_id}: winner {}",
                                    result.winner_user_id
                                ),
                                // 被手动开奖抢先或窗口内无参与者，跳过即可
                                Err(AppError::AlreadyDrawn) => {}
                                Err(AppError::NoEligibleEntrants) => {
                                    log::warn!("draw {draw_id} has no eligible entrants");
                                }
                                Err(e) => log::error!("draw sweep failed for {draw_id}: {e:?}"),
                            }
                        }
                    }
                    Err(e) => log::error!("draw sweep query failed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            }
        });
    }
}
