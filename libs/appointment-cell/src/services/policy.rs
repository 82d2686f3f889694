use thiserror::Error;

use shared_models::auth::{Role, User};

use crate::models::Appointment;

/// Actions a principal can attempt against the scheduling core.
#[derive(Debug, Clone, Copy)]
pub enum Capability<'a> {
    BookAppointment,
    CancelAppointment(&'a Appointment),
    CreateReport(&'a Appointment),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PermissionDenied(pub String);

/// Single role/ownership check shared by every orchestration flow.
pub fn authorize(principal: &User, capability: Capability<'_>) -> Result<(), PermissionDenied> {
    let role = principal.role
        .ok_or_else(|| PermissionDenied("Principal has no clinic role".to_string()))?;

    match capability {
        Capability::BookAppointment => Ok(()),
        Capability::CancelAppointment(appointment) => {
            if role == Role::Admin || appointment.involves_staff(principal.id) {
                Ok(())
            } else {
                Err(PermissionDenied("Only admins or assigned staff can cancel this appointment".to_string()))
            }
        }
        Capability::CreateReport(appointment) => {
            if role != Role::Doctor {
                return Err(PermissionDenied("Only doctors can write reports".to_string()));
            }
            if appointment.doctor_id != principal.id {
                return Err(PermissionDenied("Only the assigned doctor can write a report for this appointment".to_string()));
            }
            Ok(())
        }
    }
}
