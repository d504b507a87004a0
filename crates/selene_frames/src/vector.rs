//! Small fixed-size vector arithmetic.

pub type Vec3 = [f64; 3];

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: &Vec3, k: f64) -> Vec3 {
    [a[0] * k, a[1] * k, a[2] * k]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic() {
        let a = [1.0, 2.0, 2.0];
        let b = [0.5, -1.0, 4.0];
        assert_eq!(add(&a, &b), [1.5, 1.0, 6.0]);
        assert_eq!(sub(&a, &b), [0.5, 3.0, -2.0]);
        assert_eq!(scale(&a, 2.0), [2.0, 4.0, 4.0]);
        assert_eq!(dot(&a, &b), 6.5);
        assert_eq!(norm(&a), 3.0);
    }
}
